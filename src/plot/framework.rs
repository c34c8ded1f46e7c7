//! Shared chart plumbing.
//!
//! Every chart is described by a `ChartSpec` (ranges, series, annotation
//! lines) and rendered to SVG by `render_svg`. Keeping the plotters calls in
//! one place means the chart functions only assemble data.

use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;

use crate::error::AppError;

pub const FONT_SIZE_CHART_TITLE: u32 = 22;
pub const FONT_SIZE_AXIS_LABEL: u32 = 15;
pub const FONT_SIZE_ANNOTATION: u32 = 14;

/// A connected line series.
#[derive(Clone)]
pub struct LineData {
    pub data: Vec<(f64, f64)>,
    pub label: String,
    pub color: RGBColor,
    pub stroke_width: u32,
}

/// A scatter series drawn as filled circles.
#[derive(Clone)]
pub struct ScatterData {
    pub data: Vec<(f64, f64)>,
    pub label: String,
    pub color: RGBColor,
}

/// Vertical error bars: `(x, low, mid, high)`.
#[derive(Clone)]
pub struct ErrorBarData {
    pub data: Vec<(f64, f64, f64, f64)>,
    pub color: RGBColor,
}

/// Everything needed to draw one chart.
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub lines: Vec<LineData>,
    pub scatters: Vec<ScatterData>,
    pub error_bars: Vec<ErrorBarData>,
    /// Text lines drawn inside the plot area, top-left.
    pub annotations: Vec<String>,
}

/// Calculate a plot range with padding.
/// Adds 15% padding, or a fixed padding for degenerate ranges.
pub fn calculate_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let range = (max - min).abs();
    let padding = if range < 1e-6 { 0.5 } else { range * 0.15 };
    (min - padding, max + padding)
}

/// Render a `ChartSpec` to an SVG file.
pub fn render_svg(path: &Path, width: u32, height: u32, spec: &ChartSpec) -> Result<(), AppError> {
    let map_err = |e: String| {
        AppError::usage(format!("Failed to render chart '{}': {e}", path.display()))
    };

    let root = SVGBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| map_err(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", FONT_SIZE_CHART_TITLE))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(spec.x_range.clone(), spec.y_range.clone())
        .map_err(|e| map_err(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .label_style(("sans-serif", FONT_SIZE_AXIS_LABEL))
        .draw()
        .map_err(|e| map_err(e.to_string()))?;

    let mut has_legend_entries = false;

    for s in &spec.lines {
        let color = s.color;
        let series = chart
            .draw_series(LineSeries::new(
                s.data.iter().copied(),
                color.stroke_width(s.stroke_width),
            ))
            .map_err(|e| map_err(e.to_string()))?;
        if !s.label.is_empty() {
            has_legend_entries = true;
            series.label(&s.label).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
            });
        }
    }

    for s in &spec.scatters {
        let color = s.color;
        let series = chart
            .draw_series(
                s.data
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
            )
            .map_err(|e| map_err(e.to_string()))?;
        if !s.label.is_empty() {
            has_legend_entries = true;
            series
                .label(&s.label)
                .legend(move |(x, y)| Circle::new((x + 9, y), 3, color.filled()));
        }
    }

    for s in &spec.error_bars {
        let color = s.color;
        chart
            .draw_series(s.data.iter().map(|&(x, low, mid, high)| {
                ErrorBar::new_vertical(x, low, mid, high, color.filled(), 6)
            }))
            .map_err(|e| map_err(e.to_string()))?;
    }

    if has_legend_entries {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::LowerRight)
            .label_font(("sans-serif", FONT_SIZE_AXIS_LABEL))
            .draw()
            .map_err(|e| map_err(e.to_string()))?;
    }

    let annotation_style = ("sans-serif", FONT_SIZE_ANNOTATION)
        .into_font()
        .color(&BLACK);
    for (i, line) in spec.annotations.iter().enumerate() {
        root.draw(&Text::new(
            line.clone(),
            (80, 50 + (i as i32) * 20),
            annotation_style.clone(),
        ))
        .map_err(|e| map_err(e.to_string()))?;
    }

    root.present().map_err(|e| map_err(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_padding_is_fifteen_percent() {
        let (lo, hi) = calculate_range(0.0, 100.0);
        assert!((lo - -15.0).abs() < 1e-9);
        assert!((hi - 115.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_range_gets_fixed_padding() {
        let (lo, hi) = calculate_range(5.0, 5.0);
        assert!((lo - 4.5).abs() < 1e-9);
        assert!((hi - 5.5).abs() < 1e-9);
    }

    #[test]
    fn swapped_bounds_are_reordered() {
        let (lo, hi) = calculate_range(10.0, 0.0);
        assert!(lo < hi);
    }
}
