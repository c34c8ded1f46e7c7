//! Reporting utilities: residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{Observation, SigmoidFit};
use crate::error::AppError;
use crate::models::Logistic;

/// An observation with its fitted value and residual.
#[derive(Debug, Clone)]
pub struct ObservationResidual {
    pub observation: Observation,
    pub fitted_um: f64,
    pub residual_um: f64,
}

/// Compute fitted values and residuals for each observation.
///
/// Callers must have checked the fit category first; the curve parameters of
/// an ambiguous or no-signal fit do not describe the data.
pub fn compute_residuals(
    points: &[Observation],
    fit: &SigmoidFit,
) -> Result<Vec<ObservationResidual>, AppError> {
    let curve = Logistic {
        max: fit.max_um,
        slope: fit.slope_per_h,
        midpoint: fit.midpoint_h,
    };

    let mut out = Vec::with_capacity(points.len());
    for p in points {
        let fitted_um = curve.predict(p.time_h);
        if !fitted_um.is_finite() {
            return Err(AppError::numeric(
                "Non-finite model prediction during residual computation.",
            ));
        }
        out.push(ObservationResidual {
            observation: p.clone(),
            fitted_um,
            residual_um: p.nitrite_um - fitted_um,
        });
    }
    Ok(out)
}
