//! Read/write fit JSON files.
//!
//! The fit JSON is the "portable" representation of one analysis run:
//! - curve parameters + fit category
//! - quality diagnostics and the growth-rate estimate
//! - a precomputed curve grid for quick re-plotting
//!
//! The schema is defined by `domain::FitFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CurveGrid, ExponentialWindow, FitFile, FitResult, GrowthRate};
use crate::error::AppError;
use crate::models::Logistic;

/// Write a fit JSON file.
pub fn write_fit_json(
    path: &Path,
    result: &FitResult,
    growth: Option<&GrowthRate>,
    window: &ExponentialWindow,
    time_min: f64,
    time_max: f64,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::usage(format!(
            "Failed to create fit JSON '{}': {e}",
            path.display()
        ))
    })?;

    let curve = Logistic {
        max: result.fit.max_um,
        slope: result.fit.slope_per_h,
        midpoint: result.fit.midpoint_h,
    };
    let fit_file = FitFile {
        tool: "growth".to_string(),
        generated: chrono::Local::now().date_naive(),
        fit: result.fit.clone(),
        quality: result.quality.clone(),
        window: *window,
        growth: growth.cloned(),
        grid: build_grid(&curve, time_min, time_max, 101),
    };

    serde_json::to_writer_pretty(file, &fit_file)
        .map_err(|e| AppError::usage(format!("Failed to write fit JSON: {e}")))?;

    Ok(())
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::usage(format!("Failed to open fit JSON '{}': {e}", path.display()))
    })?;
    let fit_file: FitFile = serde_json::from_reader(file)
        .map_err(|e| AppError::usage(format!("Invalid fit JSON: {e}")))?;
    Ok(fit_file)
}

fn build_grid(curve: &Logistic, time_min: f64, time_max: f64, n: usize) -> CurveGrid {
    let n = n.max(2);
    let mut t0 = time_min;
    let mut t1 = time_max;
    if !(t0.is_finite() && t1.is_finite()) || t1 <= t0 {
        t0 = 0.0;
        t1 = 100.0;
    }

    let mut time_h = Vec::with_capacity(n);
    let mut nitrite_um = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let t = t0 + u * (t1 - t0);
        time_h.push(t);
        nitrite_um.push(curve.predict(t));
    }

    CurveGrid { time_h, nitrite_um }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitCategory, FitQuality, SigmoidFit};

    #[test]
    fn fit_json_round_trips() {
        let result = FitResult {
            fit: SigmoidFit {
                max_um: 800.0,
                slope_per_h: 0.11,
                midpoint_h: 55.0,
                category: FitCategory::Sigmoidal,
            },
            quality: FitQuality {
                sse: 10.0,
                rmse: 1.2,
                n: 6,
            },
        };
        let window = ExponentialWindow {
            start_h: 40.0,
            end_h: 80.0,
        };

        let path = std::env::temp_dir().join(format!("growth_fitfile_{}.json", std::process::id()));
        write_fit_json(&path, &result, None, &window, 0.0, 100.0).unwrap();
        let loaded = read_fit_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.tool, "growth");
        assert_eq!(loaded.fit.category, FitCategory::Sigmoidal);
        assert_eq!(loaded.grid.time_h.len(), 101);
        assert!((loaded.grid.time_h[0] - 0.0).abs() < 1e-12);
        assert!((loaded.grid.time_h[100] - 100.0).abs() < 1e-12);
        // The sampled curve hits half-max at the midpoint.
        let mid_idx = 55;
        assert!((loaded.grid.nitrite_um[mid_idx] - 400.0).abs() < 1.0);
    }
}
