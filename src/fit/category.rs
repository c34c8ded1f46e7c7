//! Categorical judgment of a fitted sigmoid.
//!
//! The fitter always returns parameters; whether those parameters mean
//! anything is decided here, gated by two sensitivity thresholds from the
//! run configuration:
//!
//! - `min_signal_fraction`: the observed dynamic range must be at least this
//!   fraction of the observed maximum for the series to have a meaningful
//!   saturation level at all. Below it: `NoSignal`.
//! - `midpoint_tolerance`: the fitted midpoint may fall at most this fraction
//!   of the observed time span outside the data. Beyond it (or with a
//!   degenerate slope): `Ambiguous`.
//!
//! Callers must branch on the category before treating the parameters as a
//! growth curve.

use crate::domain::{FitCategory, FitConfig};
use crate::models::Logistic;

/// Slopes below this magnitude (1/h) are indistinguishable from flat.
const SLOPE_EPS: f64 = 1e-6;

/// Judge the fitted parameters against the observed data.
pub fn judge(times: &[f64], values: &[f64], params: &Logistic, config: &FitConfig) -> FitCategory {
    if times.is_empty() || values.is_empty() {
        return FitCategory::NoSignal;
    }

    let y_min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let y_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if !(y_max > 0.0) || (y_max - y_min) < config.min_signal_fraction * y_max {
        return FitCategory::NoSignal;
    }
    if !params.max.is_finite() || params.max <= 0.0 {
        return FitCategory::NoSignal;
    }

    if !params.slope.is_finite() || params.slope.abs() < SLOPE_EPS {
        return FitCategory::Ambiguous;
    }

    let t_min = times.iter().copied().fold(f64::INFINITY, f64::min);
    let t_max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let tolerance = config.midpoint_tolerance * (t_max - t_min);
    if !params.midpoint.is_finite()
        || params.midpoint < t_min - tolerance
        || params.midpoint > t_max + tolerance
    {
        return FitCategory::Ambiguous;
    }

    FitCategory::Sigmoidal
}
