use std::ops::Range;

use numplot_core::{Analysis, NumError, NumResult};

/// Axis ranges covering every series and the marker.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Bounds {
    pub x: Range<f64>,
    pub y: Range<f64>,
}

impl Bounds {
    /// Fails when a range, or its span, does not fit in an `f64`.
    pub fn of(analysis: &Analysis) -> NumResult<Self> {
        let points = analysis
            .series()
            .iter()
            .flat_map(|s| s.points.iter().copied())
            .chain(analysis.marker().map(|m| m.point));

        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);
        for (px, py) in points {
            x = (x.0.min(px), x.1.max(px));
            y = (y.0.min(py), y.1.max(py));
        }

        Ok(Self {
            x: pad(x.0, x.1)?,
            y: pad(y.0, y.1)?,
        })
    }
}

/// Widen `[lo, hi]` by 5% on each side; a degenerate range becomes
/// `[lo - 1, hi + 1]`.
fn pad(lo: f64, hi: f64) -> NumResult<Range<f64>> {
    if lo > hi {
        // Nothing to plot.
        return Ok(-1.0..1.0);
    }
    let span = hi - lo;
    let padded = if span <= f64::EPSILON * lo.abs().max(hi.abs()).max(1.0) {
        (lo - 1.0)..(hi + 1.0)
    } else {
        let margin = span * 0.05;
        (lo - margin)..(hi + margin)
    };
    if !span.is_finite() || !padded.start.is_finite() || !padded.end.is_finite() {
        return Err(NumError::Plot(format!(
            "values between {lo:e} and {hi:e} are too far apart to plot"
        )));
    }
    Ok(padded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use numplot_core::{analyze, parse_samples, AnalysisOptions};

    fn bounds_for(data: &str, method: &str) -> NumResult<Bounds> {
        let samples = parse_samples(data).unwrap();
        let out = analyze(&samples, method, &AnalysisOptions::default()).unwrap();
        Bounds::of(out.analysis().unwrap())
    }

    #[test]
    fn test_padding() {
        let b = bounds_for("0,10", "derivative").unwrap();
        assert!((b.x.start + 0.05).abs() < 1e-12);
        assert!((b.x.end - 1.05).abs() < 1e-12);
        assert!((b.y.start + 0.5).abs() < 1e-12);
        assert!((b.y.end - 10.5).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_ranges_widen() {
        let b = bounds_for("3,3,3", "minimum").unwrap();
        assert_eq!(b.y, 2.0..4.0);

        let b = bounds_for("7", "minimum").unwrap();
        assert_eq!(b.x, -1.0..1.0);
        assert_eq!(b.y, 6.0..8.0);
    }

    #[test]
    fn test_overflowing_span_is_error() {
        let err = bounds_for("1e308,-1e308", "minimum").unwrap_err();
        assert!(matches!(err, NumError::Plot(_)), "{err}");
    }

    #[test]
    fn test_large_but_finite_span() {
        let b = bounds_for("1e300,-1e300", "minimum").unwrap();
        assert!(b.y.start.is_finite() && b.y.end.is_finite());
        assert!(b.y.start < -1e300 && b.y.end > 1e300);
    }
}
