//! Shared "fit pipeline" logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> sigmoid fit + judgment -> window extraction -> mu_max regression
//!
//! The CLI front-end can then focus on presentation and file outputs.

use crate::domain::{FitCategory, FitConfig, FitResult, GrowthRate};
use crate::error::AppError;
use crate::fit::fit_sigmoid;
use crate::growth::window::LogPoint;
use crate::growth::{extract_log_phase, growth_rate_from_log_points};
use crate::io::ingest::{IngestedData, load_observations};
use crate::report::{ObservationResidual, compute_residuals};

/// All computed outputs of a single `growth fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub result: FitResult,
    pub log_points: Vec<LogPoint>,
    pub growth: GrowthRate,
    /// Present only when the fit category is sigmoidal; the parameters of an
    /// ambiguous or no-signal fit do not describe the data.
    pub residuals: Option<Vec<ObservationResidual>>,
}

/// Execute the full analysis pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    // 1) Ingest and normalize the CSV.
    let ingest = load_observations(&config.csv_path)?;

    // 2) Fit the sigmoid and judge it.
    let result = fit_sigmoid(&ingest.points, config)?;

    // 3) Extract the exponential window and estimate mu_max.
    let log_points = extract_log_phase(&ingest.points, &config.window)?;
    let growth = growth_rate_from_log_points(&log_points, &config.window)?;

    // 4) Residuals, gated on the fit category.
    let residuals = match result.fit.category {
        FitCategory::Sigmoidal => Some(compute_residuals(&ingest.points, &result.fit)?),
        FitCategory::Ambiguous | FitCategory::NoSignal => None,
    };

    Ok(RunOutput {
        ingest,
        result,
        log_points,
        growth,
        residuals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExponentialWindow;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_temp_csv(name: &str, content: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("growth_pipeline_{}_{name}.csv", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn config_for(path: PathBuf) -> FitConfig {
        FitConfig {
            csv_path: path,
            window: ExponentialWindow {
                start_h: 40.0,
                end_h: 80.0,
            },
            min_signal_fraction: 0.2,
            midpoint_tolerance: 0.25,
            slope_min: 0.005,
            slope_max: 2.0,
            slope_steps: 40,
            midpoint_steps: 40,
            refine_iters: 25,
            out_dir: PathBuf::new(),
            plot: false,
            plot_width: 900,
            plot_height: 600,
            export_results: None,
            export_fit: None,
        }
    }

    #[test]
    fn end_to_end_on_accumulation_series() {
        let path = write_temp_csv(
            "ok",
            "time,replicate,generation,nitrite\n\
             0,R1,G1,5\n\
             20,R1,G1,5\n\
             30,R1,G1,\n\
             40,R1,G1,80\n\
             60,R1,G1,400\n\
             80,R1,G1,780\n\
             100,R1,G1,800\n",
        );
        let config = config_for(path.clone());
        let run = run_fit(&config).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(run.ingest.rows_used, 6);
        assert_eq!(run.ingest.row_errors.len(), 1);
        assert_eq!(run.result.fit.category, FitCategory::Sigmoidal);
        assert!(run.residuals.is_some());
        assert_eq!(run.log_points.len(), 3);

        let expected_mu = (780.0f64 / 80.0).ln() / 40.0;
        assert!((run.growth.mu_max_per_h - expected_mu).abs() < 1e-9);
        assert!(run.growth.mu_max_per_h > 0.0);
    }

    #[test]
    fn empty_window_aborts_the_run() {
        let path = write_temp_csv(
            "window",
            "time,nitrite\n0,5\n20,5\n100,780\n120,800\n150,805\n",
        );
        let config = config_for(path.clone());
        let err = run_fit(&config).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn flat_series_skips_residuals() {
        let path = write_temp_csv(
            "flat",
            "time,nitrite\n0,500\n20,501\n40,499\n60,500\n80,502\n100,500\n",
        );
        let config = config_for(path.clone());
        let run = run_fit(&config).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(run.result.fit.category, FitCategory::NoSignal);
        assert!(run.residuals.is_none());
    }
}
