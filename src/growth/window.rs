//! Exponential-phase extraction.
//!
//! The analyst picks the window by eye from the raw chart; this module only
//! applies it. Filtering is inclusive on both bounds, and the log transform
//! refuses non-positive concentrations: a reading of 0 uM inside the chosen
//! exponential phase means the window itself is wrong, and silently producing
//! a NaN slope would be worse than stopping.

use crate::domain::{ExponentialWindow, Observation};
use crate::error::AppError;

/// A log-transformed observation inside the exponential window.
#[derive(Debug, Clone, Copy)]
pub struct LogPoint {
    pub time_h: f64,
    pub ln_nitrite: f64,
}

/// Filter observations to the window and log-transform the concentration.
///
/// Returns an empty vector when the bounds exclude every observation; the
/// downstream regression is responsible for rejecting that explicitly.
pub fn extract_log_phase(
    points: &[Observation],
    window: &ExponentialWindow,
) -> Result<Vec<LogPoint>, AppError> {
    if !(window.start_h.is_finite() && window.end_h.is_finite()) || window.end_h < window.start_h {
        return Err(AppError::usage(format!(
            "Invalid exponential window: [{}, {}] h (end must be >= start).",
            window.start_h, window.end_h
        )));
    }

    let mut out = Vec::new();
    for p in points.iter().filter(|p| window.contains(p.time_h)) {
        if p.nitrite_um <= 0.0 {
            return Err(AppError::data(format!(
                "Non-positive nitrite ({} uM at t={} h) inside the exponential window \
                 [{}, {}] h; the log transform is undefined there. Adjust the window.",
                p.nitrite_um, p.time_h, window.start_h, window.end_h
            )));
        }
        out.push(LogPoint {
            time_h: p.time_h,
            ln_nitrite: p.nitrite_um.ln(),
        });
    }

    Ok(out)
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
    fn bounds_are_inclusive() {
        let points = vec![obs(39.9, 10.0), obs(40.0, 20.0), obs(80.0, 30.0), obs(80.1, 40.0)];
        let got = extract_log_phase(&points, &window(40.0, 80.0)).unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].time_h, 40.0);
        assert_eq!(got[1].time_h, 80.0);
        assert!((got[0].ln_nitrite - 20.0f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn excluding_bounds_yield_empty() {
        let points = vec![obs(0.0, 10.0), obs(100.0, 20.0)];
        let got = extract_log_phase(&points, &window(40.0, 80.0)).unwrap();
        assert!(got.is_empty());
    }

    #[test]
    fn non_positive_value_in_window_is_an_error() {
        let points = vec![obs(50.0, 0.0), obs(60.0, 10.0)];
        let err = extract_log_phase(&points, &window(40.0, 80.0)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn non_positive_value_outside_window_is_fine() {
        let points = vec![obs(0.0, 0.0), obs(50.0, 10.0), obs(60.0, 20.0)];
        let got = extract_log_phase(&points, &window(40.0, 80.0)).unwrap();
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = extract_log_phase(&[obs(1.0, 1.0)], &window(80.0, 40.0)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
