//! Specific growth rate estimation.
//!
//! During the exponential phase, production follows `N(t) ~ N0 * exp(mu * t)`,
//! so `ln N` is linear in `t` and the OLS slope over the window is the
//! maximum specific growth rate (1/h). The slope's standard error and the
//! regression R^2 come along as diagnostics.

use crate::domain::{ExponentialWindow, GrowthRate, Observation};
use crate::error::AppError;
use crate::growth::window::{LogPoint, extract_log_phase};
use crate::math::fit_line;

/// Estimate `mu_max` over the analyst-chosen window.
pub fn estimate_growth_rate(
    points: &[Observation],
    window: &ExponentialWindow,
) -> Result<GrowthRate, AppError> {
    let log_points = extract_log_phase(points, window)?;
    growth_rate_from_log_points(&log_points, window)
}

/// Estimate `mu_max` from already-extracted log points.
///
/// Split out so the pipeline can reuse the extraction for plotting.
pub fn growth_rate_from_log_points(
    log_points: &[LogPoint],
    window: &ExponentialWindow,
) -> Result<GrowthRate, AppError> {
    if log_points.is_empty() {
        return Err(AppError::data(format!(
            "Exponential window [{}, {}] h contains no observations.",
            window.start_h, window.end_h
        )));
    }

    let times: Vec<f64> = log_points.iter().map(|p| p.time_h).collect();
    let ln_values: Vec<f64> = log_points.iter().map(|p| p.ln_nitrite).collect();
    let fit = fit_line(&times, &ln_values)?;

    Ok(GrowthRate {
        mu_max_per_h: fit.slope,
        std_error: fit.slope_std_error,
        r_squared: fit.r_squared,
        intercept_ln_um: fit.intercept,
        n: fit.n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(time_h: f64, nitrite_um: f64) -> Observation {
        Observation {
            time_h,
            replicate: None,
            generation: None,
            nitrite_um,
            summary: None,
        }
    }

    fn window(start_h: f64, end_h: f64) -> ExponentialWindow {
        ExponentialWindow { start_h, end_h }
    }

    #[test]
    fn recovers_exact_exponential_rate() {
        // N(t) = 3 * exp(0.06 t): the log-linear fit is exact.
        let points: Vec<_> = (0..=10)
            .map(|i| {
                let t = i as f64 * 4.0;
                obs(t, 3.0 * (0.06 * t).exp())
            })
            .collect();

        let rate = estimate_growth_rate(&points, &window(0.0, 40.0)).unwrap();
        assert!((rate.mu_max_per_h - 0.06).abs() < 1e-12);
        assert!((rate.r_squared - 1.0).abs() < 1e-12);
        assert!(rate.std_error < 1e-9);
        assert_eq!(rate.n, 11);
    }

    #[test]
    fn nitrite_accumulation_scenario() {
        // Times {0,20,40,60,80,100} h, nitrite {5,5,80,400,780,800} uM,
        // window [40, 80]: the slope must be positive and, with three evenly
        // spaced points, exactly ln(780/80)/40.
        let points = vec![
            obs(0.0, 5.0),
            obs(20.0, 5.0),
            obs(40.0, 80.0),
            obs(60.0, 400.0),
            obs(80.0, 780.0),
            obs(100.0, 800.0),
        ];

        let rate = estimate_growth_rate(&points, &window(40.0, 80.0)).unwrap();
        let expected = (780.0f64 / 80.0).ln() / 40.0;
        assert!(rate.mu_max_per_h > 0.0);
        assert!((rate.mu_max_per_h - expected).abs() < 1e-12);
        assert_eq!(rate.n, 3);
    }

    #[test]
    fn empty_window_fails_explicitly() {
        let points = vec![obs(0.0, 5.0), obs(100.0, 800.0)];
        let err = estimate_growth_rate(&points, &window(40.0, 80.0)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn single_point_window_fails_explicitly() {
        let points = vec![obs(0.0, 5.0), obs(60.0, 400.0), obs(100.0, 800.0)];
        let err = estimate_growth_rate(&points, &window(50.0, 70.0)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
