//! Candidate grid generation for the sigmoid fit.
//!
//! We search the nonlinear `(slope, midpoint)` pair on a deterministic grid.
//!
//! Why grid search?
//! - It avoids the local-minima issues of free nonlinear optimization.
//! - It is deterministic given the same inputs/flags.
//! - With two nonlinear parameters, a modest grid is fast enough for a
//!   single-dataset batch run.
//!
//! Slope magnitudes are log-spaced (growth steepness varies over orders of
//! magnitude); midpoints are linear across the observed time span. The slope
//! sign is inferred from the data once, not searched.

use crate::error::AppError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::usage(format!(
            "Invalid slope range: min={min}, max={max} (must be finite, >0, and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::usage("Slope steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// Generate `steps` evenly spaced midpoint candidates across `[t_min, t_max]`.
pub fn midpoint_candidates(t_min: f64, t_max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(t_min.is_finite() && t_max.is_finite() && t_max > t_min) {
        return Err(AppError::data(format!(
            "Invalid time span for midpoint candidates: [{t_min}, {t_max}]."
        )));
    }
    if steps < 2 {
        return Err(AppError::usage("Midpoint steps must be >= 2."));
    }

    let step = (t_max - t_min) / (steps as f64 - 1.0);
    Ok((0..steps).map(|i| t_min + step * i as f64).collect())
}

/// Infer the slope sign from the data.
///
/// Plain covariance of value against time: rising series get `+1.0`, falling
/// series `-1.0`. A tie (flat or degenerate) defaults to rising, which is the
/// common case for product-accumulation curves.
pub fn infer_slope_direction(times: &[f64], values: &[f64]) -> f64 {
    let n = times.len().min(values.len());
    if n < 2 {
        return 1.0;
    }

    let t_bar = times[..n].iter().sum::<f64>() / n as f64;
    let v_bar = values[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    for i in 0..n {
        cov += (times[i] - t_bar) * (values[i] - v_bar);
    }

    if cov.is_finite() && cov < 0.0 { -1.0 } else { 1.0 }
}

/// Build the full `(slope, midpoint)` candidate grid.
pub fn candidate_grid(
    slope_min: f64,
    slope_max: f64,
    slope_steps: usize,
    midpoint_steps: usize,
    t_min: f64,
    t_max: f64,
    direction: f64,
) -> Result<Vec<(f64, f64)>, AppError> {
    let magnitudes = log_space(slope_min, slope_max, slope_steps)?;
    let midpoints = midpoint_candidates(t_min, t_max, midpoint_steps)?;

    let mut out = Vec::with_capacity(magnitudes.len() * midpoints.len());
    for &m in &magnitudes {
        for &mid in &midpoints {
            out.push((direction * m, mid));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.01, 1.0, 5).unwrap();
        assert!((v[0] - 0.01).abs() < 1e-12);
        assert!((v[v.len() - 1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn log_space_rejects_bad_range() {
        assert!(log_space(0.0, 1.0, 5).is_err());
        assert!(log_space(1.0, 1.0, 5).is_err());
        assert!(log_space(0.1, 1.0, 1).is_err());
    }

    #[test]
    fn midpoints_span_the_range() {
        let v = midpoint_candidates(0.0, 100.0, 5).unwrap();
        assert_eq!(v.len(), 5);
        assert!((v[0] - 0.0).abs() < 1e-12);
        assert!((v[4] - 100.0).abs() < 1e-12);
    }

    #[test]
    fn direction_follows_trend() {
        let t = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(infer_slope_direction(&t, &[1.0, 2.0, 3.0, 4.0]), 1.0);
        assert_eq!(infer_slope_direction(&t, &[4.0, 3.0, 2.0, 1.0]), -1.0);
        assert_eq!(infer_slope_direction(&t, &[2.0, 2.0, 2.0, 2.0]), 1.0);
    }

    #[test]
    fn grid_applies_direction_sign() {
        let grid = candidate_grid(0.1, 1.0, 3, 2, 0.0, 10.0, -1.0).unwrap();
        assert_eq!(grid.len(), 6);
        assert!(grid.iter().all(|(s, _)| *s < 0.0));
    }
}
