//! Draws an [`Analysis`] onto a PNG with `plotters`.
//!
//! Text uses DejaVu Sans, embedded in the binary and registered with the
//! `ab_glyph` font backend on first use.

use std::path::Path;
use std::sync::OnceLock;

use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};

use numplot_core::{Analysis, Method, NumError, NumResult, SeriesStyle};

use crate::bounds::Bounds;

const GRID: RGBColor = RGBColor(225, 225, 225);
const AXIS: RGBColor = RGBColor(120, 120, 120);
const DATA: RGBColor = RGBColor(31, 119, 180);
const DERIVED: RGBColor = RGBColor(214, 39, 40);

const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
static FONT: OnceLock<bool> = OnceLock::new();

fn ensure_font() -> NumResult<()> {
    let ok = *FONT.get_or_init(|| {
        register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok()
    });
    if ok {
        Ok(())
    } else {
        Err(NumError::Plot("embedded font could not be loaded".into()))
    }
}

/// One legend line describing how a series was drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub label: String,
    /// CSS hex color, e.g. `#1f77b4`.
    pub color: String,
    pub shape: &'static str,
}

fn hex(c: RGBColor) -> String {
    format!("#{:02x}{:02x}{:02x}", c.0, c.1, c.2)
}

/// Legend matching what [`render_png`] draws for `analysis`.
pub fn legend(analysis: &Analysis) -> Vec<LegendEntry> {
    let mut entries: Vec<LegendEntry> = analysis
        .series()
        .iter()
        .map(|s| {
            let (color, shape) = match s.style {
                SeriesStyle::Data => (DATA, "line with markers"),
                SeriesStyle::Derived => (DERIVED, "line"),
                SeriesStyle::Baseline => (DERIVED, "horizontal line"),
            };
            LegendEntry {
                label: s.label.clone(),
                color: hex(color),
                shape,
            }
        })
        .collect();
    if let Some(m) = analysis.marker() {
        entries.push(LegendEntry {
            label: m.label.clone(),
            color: hex(DERIVED),
            shape: "marker",
        });
    }
    entries
}

fn plot_err<E: std::fmt::Display>(e: E) -> NumError {
    NumError::Plot(e.to_string())
}

fn caption(analysis: &Analysis) -> &str {
    match analysis.method() {
        // The title names a quadratic; the series label carries the real degree.
        Method::Fit => analysis
            .series()
            .get(1)
            .map_or(Method::Fit.title(), |s| s.label.as_str()),
        m => m.title(),
    }
}

fn legend_line(color: RGBColor) -> impl Fn((i32, i32)) -> PathElement<(i32, i32)> {
    move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
}

pub(crate) fn render_png(analysis: &Analysis, path: &Path, size: (u32, u32)) -> NumResult<()> {
    let bounds = Bounds::of(analysis)?;
    ensure_font()?;

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption(analysis), (FONT_FAMILY, 22).into_font())
        .margin(15)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(bounds.x.clone(), bounds.y.clone())
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .light_line_style(GRID)
        .axis_style(AXIS)
        .x_desc("x")
        .y_desc("y")
        .label_style((FONT_FAMILY, 13))
        .draw()
        .map_err(plot_err)?;

    let (x0, x1) = (bounds.x.start, bounds.x.end);
    for series in analysis.series() {
        let points = series.points.iter().copied();
        match series.style {
            SeriesStyle::Data => {
                chart
                    .draw_series(LineSeries::new(points.clone(), DATA.stroke_width(2)))
                    .map_err(plot_err)?
                    .label(series.label.as_str())
                    .legend(legend_line(DATA));
                chart
                    .draw_series(points.map(|p| Circle::new(p, 4, DATA.filled())))
                    .map_err(plot_err)?;
            }
            SeriesStyle::Derived => {
                chart
                    .draw_series(LineSeries::new(points, DERIVED.stroke_width(2)))
                    .map_err(plot_err)?
                    .label(series.label.as_str())
                    .legend(legend_line(DERIVED));
            }
            SeriesStyle::Baseline => {
                // Stretch across the whole plot like a horizontal rule.
                let y = series.points.first().map(|p| p.1).unwrap_or(0.0);
                chart
                    .draw_series(LineSeries::new(vec![(x0, y), (x1, y)], DERIVED.stroke_width(2)))
                    .map_err(plot_err)?
                    .label(series.label.as_str())
                    .legend(legend_line(DERIVED));
            }
        }
    }

    if let Some(marker) = analysis.marker() {
        chart
            .draw_series(std::iter::once(Circle::new(
                marker.point,
                6,
                DERIVED.filled(),
            )))
            .map_err(plot_err)?
            .label(marker.label.as_str())
            .legend(|(x, y)| Circle::new((x + 10, y), 5, DERIVED.filled()));
    }

    chart
        .configure_series_labels()
        .label_font((FONT_FAMILY, 13))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use numplot_core::{analyze, parse_samples, AnalysisOptions};

    fn legend_for(data: &str, method: &str) -> Vec<LegendEntry> {
        let samples = parse_samples(data).unwrap();
        let out = analyze(&samples, method, &AnalysisOptions::default()).unwrap();
        legend(out.analysis().unwrap())
    }

    fn analysis_for(data: &str, method: &str) -> Analysis {
        let samples = parse_samples(data).unwrap();
        let out = analyze(&samples, method, &AnalysisOptions::default()).unwrap();
        out.analysis().unwrap().clone()
    }

    #[test]
    fn test_render_with_text_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        for method in ["interpolation", "fit", "derivative", "minimum"] {
            let path = dir.path().join(format!("{method}.png"));
            render_png(&analysis_for("3,1,4,1,5", method), &path, (640, 480)).unwrap();
            let bytes = std::fs::read(&path).unwrap();
            assert_eq!(&bytes[..4], b"\x89PNG", "{method}");
        }
    }

    #[test]
    fn test_render_overflow_is_error_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        let err = render_png(&analysis_for("1e308,-1e308", "minimum"), &path, (640, 480))
            .unwrap_err();
        assert!(matches!(err, NumError::Plot(_)), "{err}");
        assert!(!path.exists());
    }

    #[test]
    fn test_caption_uses_fit_label() {
        assert_eq!(caption(&analysis_for("1,2,3", "fit")), "Quadratic fit");
        assert_eq!(caption(&analysis_for("1,2,3", "derivative")), "Discrete derivative");
    }

    #[test]
    fn test_legend_interpolation() {
        let entries = legend_for("1,2,3", "interpolation");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "Original data");
        assert_eq!(entries[0].color, "#1f77b4");
        assert_eq!(entries[1].label, "Interpolation");
        assert_eq!(entries[1].color, "#d62728");
    }

    #[test]
    fn test_legend_minimum_has_marker() {
        let entries = legend_for("3,1,2", "minimum");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].label, "Minimum: 1.0");
        assert_eq!(entries[1].shape, "horizontal line");
        assert_eq!(entries[2].shape, "marker");
    }
}
