//! Export per-observation results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::report::ObservationResidual;

/// Write per-observation fitted values and residuals to a CSV file.
pub fn write_results_csv(path: &Path, residuals: &[ObservationResidual]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::usage(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(
        file,
        "time_h,replicate,generation,nitrite_um,fitted_um,residual_um,mean_um,stddev_um,cv_pct"
    )
    .map_err(|e| AppError::usage(format!("Failed to write export CSV header: {e}")))?;

    for r in residuals {
        let o = &r.observation;
        let (mean, stddev, cv) = match &o.summary {
            Some(s) => (
                format!("{:.4}", s.mean_um),
                format!("{:.4}", s.stddev_um),
                s.cv_pct.map(|v| format!("{v:.2}")).unwrap_or_default(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        writeln!(
            file,
            "{:.4},{},{},{:.4},{:.4},{:.4},{},{},{}",
            o.time_h,
            o.replicate.as_deref().unwrap_or(""),
            o.generation.as_deref().unwrap_or(""),
            o.nitrite_um,
            r.fitted_um,
            r.residual_um,
            mean,
            stddev,
            cv,
        )
        .map_err(|e| AppError::usage(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
