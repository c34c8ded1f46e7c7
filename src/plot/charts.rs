//! The diagnostic charts.
//!
//! Three artifacts per run, each independently regenerable from the
//! pipeline's intermediate results:
//!
//! - `raw_curve.svg`: nitrite vs time, one series per generation, error bars
//!   from the per-generation aggregate rows
//! - `sigmoid_fit.svg`: observations with the fitted curve overlaid and the
//!   parameter values annotated
//! - `log_phase.svg`: ln(nitrite) inside the exponential window with the
//!   regression line and the mu_max estimate annotated

use std::path::Path;

use plotters::style::RGBColor;

use crate::domain::{ExponentialWindow, FitFile, FitResult, GrowthRate, Observation};
use crate::error::AppError;
use crate::growth::window::LogPoint;
use crate::models::Logistic;
use crate::plot::framework::{
    calculate_range, render_svg, ChartSpec, ErrorBarData, LineData, ScatterData,
};

const COLOR_OBSERVATIONS: RGBColor = RGBColor(70, 70, 70);
const COLOR_MODEL: RGBColor = RGBColor(214, 39, 40);
const COLOR_REGRESSION: RGBColor = RGBColor(31, 119, 180);

/// Per-generation series colors, cycled when there are more generations.
const GENERATION_PALETTE: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
];

/// Raw activity curve: per-generation series with error bars.
pub fn render_raw_curve(
    path: &Path,
    points: &[Observation],
    width: u32,
    height: u32,
) -> Result<(), AppError> {
    if points.is_empty() {
        return Err(AppError::data("No observations to plot."));
    }

    // Group by generation label, preserving first-appearance order.
    let mut groups: Vec<(String, Vec<(f64, f64)>)> = Vec::new();
    for p in points {
        let label = p.generation.clone().unwrap_or_else(|| "all".to_string());
        match groups.iter_mut().find(|(g, _)| *g == label) {
            Some((_, data)) => data.push((p.time_h, p.nitrite_um)),
            None => groups.push((label, vec![(p.time_h, p.nitrite_um)])),
        }
    }

    let mut lines = Vec::new();
    let mut error_bars = Vec::new();
    for (i, (label, data)) in groups.iter().enumerate() {
        let color = GENERATION_PALETTE[i % GENERATION_PALETTE.len()];
        lines.push(LineData {
            data: data.clone(),
            label: label.clone(),
            color,
            stroke_width: 2,
        });

        let bars: Vec<(f64, f64, f64, f64)> = points
            .iter()
            .filter(|p| p.generation.as_deref().unwrap_or("all") == label.as_str())
            .filter_map(|p| {
                p.summary.as_ref().map(|s| {
                    (
                        p.time_h,
                        (s.mean_um - s.stddev_um).max(0.0),
                        s.mean_um,
                        s.mean_um + s.stddev_um,
                    )
                })
            })
            .collect();
        if !bars.is_empty() {
            error_bars.push(ErrorBarData { data: bars, color });
        }
    }

    let (t_lo, t_hi) = time_bounds(points);
    let mut y_hi = f64::NEG_INFINITY;
    for p in points {
        y_hi = y_hi.max(p.nitrite_um);
        if let Some(s) = &p.summary {
            y_hi = y_hi.max(s.mean_um + s.stddev_um);
        }
    }
    let (x0, x1) = calculate_range(t_lo, t_hi);
    let (y0, y1) = calculate_range(0.0, y_hi);

    let spec = ChartSpec {
        title: "Nitrite production per generation".to_string(),
        x_label: "time (h)".to_string(),
        y_label: "nitrite (uM)".to_string(),
        x_range: x0..x1,
        y_range: y0.max(0.0)..y1,
        lines,
        scatters: Vec::new(),
        error_bars,
        annotations: Vec::new(),
    };
    render_svg(path, width, height, &spec)
}

/// Observations with the fitted sigmoid overlaid and parameters annotated.
pub fn render_sigmoid_overlay(
    path: &Path,
    points: &[Observation],
    result: &FitResult,
    width: u32,
    height: u32,
) -> Result<(), AppError> {
    if points.is_empty() {
        return Err(AppError::data("No observations to plot."));
    }

    let curve = Logistic {
        max: result.fit.max_um,
        slope: result.fit.slope_per_h,
        midpoint: result.fit.midpoint_h,
    };

    let (t_lo, t_hi) = time_bounds(points);
    let model_line: Vec<(f64, f64)> = sample_curve(&curve, t_lo, t_hi, 201);

    let observed: Vec<(f64, f64)> = points.iter().map(|p| (p.time_h, p.nitrite_um)).collect();
    let y_hi = observed
        .iter()
        .map(|&(_, y)| y)
        .chain(model_line.iter().map(|&(_, y)| y))
        .fold(f64::NEG_INFINITY, f64::max);

    let (x0, x1) = calculate_range(t_lo, t_hi);
    let (y0, y1) = calculate_range(0.0, y_hi);

    let spec = ChartSpec {
        title: "Sigmoidal model fit".to_string(),
        x_label: "time (h)".to_string(),
        y_label: "nitrite (uM)".to_string(),
        x_range: x0..x1,
        y_range: y0.max(0.0)..y1,
        lines: vec![LineData {
            data: model_line,
            label: "model".to_string(),
            color: COLOR_MODEL,
            stroke_width: 2,
        }],
        scatters: vec![ScatterData {
            data: observed,
            label: "observed".to_string(),
            color: COLOR_OBSERVATIONS,
        }],
        error_bars: Vec::new(),
        annotations: vec![
            format!("max = {:.1} uM", result.fit.max_um),
            format!("slope = {:.4} 1/h", result.fit.slope_per_h),
            format!("midpoint = {:.1} h", result.fit.midpoint_h),
            format!("RMSE = {:.2} uM", result.quality.rmse),
        ],
    };
    render_svg(path, width, height, &spec)
}

/// Log-linear regression over the exponential window.
pub fn render_log_phase(
    path: &Path,
    log_points: &[LogPoint],
    rate: &GrowthRate,
    window: &ExponentialWindow,
    width: u32,
    height: u32,
) -> Result<(), AppError> {
    if log_points.is_empty() {
        return Err(AppError::data("No observations in the exponential window to plot."));
    }

    let observed: Vec<(f64, f64)> = log_points.iter().map(|p| (p.time_h, p.ln_nitrite)).collect();

    let t_lo = observed.iter().map(|&(t, _)| t).fold(f64::INFINITY, f64::min);
    let t_hi = observed.iter().map(|&(t, _)| t).fold(f64::NEG_INFINITY, f64::max);
    let line_at = |t: f64| rate.intercept_ln_um + rate.mu_max_per_h * t;
    let regression = vec![(t_lo, line_at(t_lo)), (t_hi, line_at(t_hi))];

    let y_lo = observed
        .iter()
        .map(|&(_, y)| y)
        .chain(regression.iter().map(|&(_, y)| y))
        .fold(f64::INFINITY, f64::min);
    let y_hi = observed
        .iter()
        .map(|&(_, y)| y)
        .chain(regression.iter().map(|&(_, y)| y))
        .fold(f64::NEG_INFINITY, f64::max);

    let (x0, x1) = calculate_range(t_lo, t_hi);
    let (y0, y1) = calculate_range(y_lo, y_hi);

    let spec = ChartSpec {
        title: format!(
            "Exponential phase [{:.0}, {:.0}] h",
            window.start_h, window.end_h
        ),
        x_label: "time (h)".to_string(),
        y_label: "ln nitrite (ln uM)".to_string(),
        x_range: x0..x1,
        y_range: y0..y1,
        lines: vec![LineData {
            data: regression,
            label: "regression".to_string(),
            color: COLOR_REGRESSION,
            stroke_width: 2,
        }],
        scatters: vec![ScatterData {
            data: observed,
            label: "ln(observed)".to_string(),
            color: COLOR_OBSERVATIONS,
        }],
        error_bars: Vec::new(),
        annotations: vec![
            format!(
                "mu_max = {:.4} +/- {:.4} 1/h",
                rate.mu_max_per_h, rate.std_error
            ),
            format!("R^2 = {:.4}", rate.r_squared),
            format!("n = {}", rate.n),
        ],
    };
    render_svg(path, width, height, &spec)
}

/// Re-render the model curve from a saved fit JSON.
pub fn render_fit_file(path: &Path, file: &FitFile, width: u32, height: u32) -> Result<(), AppError> {
    if file.grid.time_h.len() != file.grid.nitrite_um.len() || file.grid.time_h.is_empty() {
        return Err(AppError::usage("Fit JSON curve grid is empty or inconsistent."));
    }

    let data: Vec<(f64, f64)> = file
        .grid
        .time_h
        .iter()
        .copied()
        .zip(file.grid.nitrite_um.iter().copied())
        .collect();

    let t_lo = file.grid.time_h[0];
    let t_hi = file.grid.time_h[file.grid.time_h.len() - 1];
    let y_hi = file
        .grid
        .nitrite_um
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let (x0, x1) = calculate_range(t_lo, t_hi);
    let (y0, y1) = calculate_range(0.0, y_hi);

    let mut annotations = vec![
        format!("category = {}", file.fit.category.display_name()),
        format!("max = {:.1} uM", file.fit.max_um),
        format!("slope = {:.4} 1/h", file.fit.slope_per_h),
        format!("midpoint = {:.1} h", file.fit.midpoint_h),
    ];
    if let Some(growth) = &file.growth {
        annotations.push(format!(
            "mu_max = {:.4} +/- {:.4} 1/h (R^2 = {:.4})",
            growth.mu_max_per_h, growth.std_error, growth.r_squared
        ));
    }

    let spec = ChartSpec {
        title: format!("Fitted growth curve ({})", file.generated),
        x_label: "time (h)".to_string(),
        y_label: "nitrite (uM)".to_string(),
        x_range: x0..x1,
        y_range: y0.max(0.0)..y1,
        lines: vec![LineData {
            data,
            label: "model".to_string(),
            color: COLOR_MODEL,
            stroke_width: 2,
        }],
        scatters: Vec::new(),
        error_bars: Vec::new(),
        annotations,
    };
    render_svg(path, width, height, &spec)
}

fn time_bounds(points: &[Observation]) -> (f64, f64) {
    let lo = points.iter().map(|p| p.time_h).fold(f64::INFINITY, f64::min);
    let hi = points
        .iter()
        .map(|p| p.time_h)
        .fold(f64::NEG_INFINITY, f64::max);
    (lo, hi)
}

fn sample_curve(curve: &Logistic, t0: f64, t1: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let t = t0 + u * (t1 - t0);
            (t, curve.predict(t))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitCategory, FitQuality, SigmoidFit};

    fn obs(time_h: f64, nitrite_um: f64, generation: Option<&str>) -> Observation {
        Observation {
            time_h,
            replicate: None,
            generation: generation.map(str::to_string),
            nitrite_um,
            summary: None,
        }
    }

    #[test]
    fn raw_curve_renders_to_svg() {
        let points = vec![
            obs(0.0, 5.0, Some("G1")),
            obs(50.0, 400.0, Some("G1")),
            obs(100.0, 800.0, Some("G2")),
        ];
        let path = std::env::temp_dir().join(format!("growth_raw_{}.svg", std::process::id()));
        render_raw_curve(&path, &points, 640, 480).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(written.contains("<svg"));
    }

    #[test]
    fn overlay_renders_annotations() {
        let points = vec![
            obs(0.0, 5.0, None),
            obs(50.0, 400.0, None),
            obs(100.0, 800.0, None),
        ];
        let result = FitResult {
            fit: SigmoidFit {
                max_um: 800.0,
                slope_per_h: 0.11,
                midpoint_h: 50.0,
                category: FitCategory::Sigmoidal,
            },
            quality: FitQuality {
                sse: 9.0,
                rmse: 1.7,
                n: 3,
            },
        };
        let path = std::env::temp_dir().join(format!("growth_overlay_{}.svg", std::process::id()));
        render_sigmoid_overlay(&path, &points, &result, 640, 480).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(written.contains("midpoint"));
    }

    #[test]
    fn empty_input_is_rejected() {
        let path = std::env::temp_dir().join("growth_empty.svg");
        let err = render_raw_curve(&path, &[], 640, 480).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
