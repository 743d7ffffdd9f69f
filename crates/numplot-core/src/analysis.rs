//! Method dispatch: turns samples plus a method token into a summary and the
//! series to plot.

use serde::Serialize;

use crate::error::{NumError, NumResult};
use crate::method::Method;
use crate::numeric;
use crate::samples::Samples;

/// Summary returned for a method token that matches no [`Method`].
pub const UNRECOGNIZED: &str = "Method not recognized.";

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Query points for interpolation, spread evenly over the sample range.
    pub interp_points: usize,
    pub fit_degree: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            interp_points: 100,
            fit_degree: 2,
        }
    }
}

/// How a renderer should draw a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStyle {
    /// Input samples: solid line with circle markers.
    Data,
    /// Computed curve, drawn over the data.
    Derived,
    /// Horizontal reference line spanning the sample range.
    Baseline,
}

#[derive(Debug, Clone, Serialize)]
pub struct Series {
    pub label: String,
    pub style: SeriesStyle,
    pub points: Vec<(f64, f64)>,
}

/// Single highlighted point (e.g. where the minimum is reached).
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub label: String,
    pub point: (f64, f64),
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    method: Method,
    summary: String,
    series: Vec<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    marker: Option<Marker>,
}

impl Analysis {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Original data first, then the derived series.
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Analysis(Analysis),
    /// The token named no known method; nothing should be plotted.
    Unrecognized,
}

impl Outcome {
    pub fn summary(&self) -> &str {
        match self {
            Self::Analysis(a) => a.summary(),
            Self::Unrecognized => UNRECOGNIZED,
        }
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            Self::Analysis(a) => Some(a),
            Self::Unrecognized => None,
        }
    }
}

/// Resolve `method` and run it. Unknown tokens are not an error: they yield
/// [`Outcome::Unrecognized`].
pub fn analyze(samples: &Samples, method: &str, opts: &AnalysisOptions) -> NumResult<Outcome> {
    match method.parse::<Method>() {
        Ok(m) => run(samples, m, opts).map(Outcome::Analysis),
        Err(_) => Ok(Outcome::Unrecognized),
    }
}

pub fn run(samples: &Samples, method: Method, opts: &AnalysisOptions) -> NumResult<Analysis> {
    let xs = samples.xs();
    let ys = samples.ys();
    let data = Series {
        label: "Original data".into(),
        style: SeriesStyle::Data,
        points: samples.points(),
    };

    let (summary, derived, marker) = match method {
        Method::Interpolation => {
            let last = (samples.len() - 1) as f64;
            let qx = numeric::linspace(0.0, last, opts.interp_points.max(2));
            let qy = numeric::interp_many(&qx, &xs, ys)?;
            let series = Series {
                label: "Interpolation".into(),
                style: SeriesStyle::Derived,
                points: qx.into_iter().zip(qy).collect(),
            };
            ("Interpolation generated successfully.".to_string(), series, None)
        }
        Method::Fit => {
            let coeffs = numeric::polyfit(&xs, ys, opts.fit_degree)?;
            let label = if opts.fit_degree == 2 {
                "Quadratic fit".to_string()
            } else {
                format!("Polynomial fit (degree {})", opts.fit_degree)
            };
            let series = Series {
                label,
                style: SeriesStyle::Derived,
                points: xs
                    .iter()
                    .map(|&x| (x, numeric::polyval(&coeffs, x)))
                    .collect(),
            };
            (format!("Polynomial coefficients: {coeffs:?}"), series, None)
        }
        Method::Derivative => {
            let d = numeric::diff(ys);
            let series = Series {
                label: "Derivative".into(),
                style: SeriesStyle::Derived,
                points: xs.iter().copied().zip(d.iter().copied()).collect(),
            };
            (format!("Derivatives: {d:?}"), series, None)
        }
        Method::Minimum => {
            let (idx, m) = numeric::min(ys)?;
            let last = (samples.len() - 1) as f64;
            let series = Series {
                label: format!("Minimum: {m:?}"),
                style: SeriesStyle::Baseline,
                points: vec![(0.0, m), (last, m)],
            };
            let marker = Marker {
                label: format!("x = {idx}"),
                point: (idx as f64, m),
            };
            (format!("Minimum value: {m:?}"), series, Some(marker))
        }
    };

    // Samples are finite, but differences and fitted values can overflow.
    if let Some(&(_, y)) = derived.points.iter().find(|(_, y)| !y.is_finite()) {
        return Err(NumError::NonFinite(y.to_string()));
    }

    Ok(Analysis {
        method,
        summary,
        series: vec![data, derived],
        marker,
    })
}
