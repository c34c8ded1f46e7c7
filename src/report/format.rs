//! Formatted terminal output for a run.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{FitCategory, FitConfig, FitResult, GrowthRate};
use crate::io::ingest::IngestedData;
use crate::models::Logistic;

/// How many row-level ingest errors to show before eliding the rest.
const MAX_ROW_ERRORS_SHOWN: usize = 5;

/// Format the full run summary (dataset stats + fit diagnostics + growth rate).
pub fn format_run_summary(
    ingest: &IngestedData,
    result: &FitResult,
    growth: &GrowthRate,
    config: &FitConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== growth - Nitrite Growth-Curve Fit ===\n");
    out.push_str(&format!("Input: {}\n", config.csv_path.display()));
    out.push_str(&format!(
        "Rows: {} read, {} used\n",
        ingest.rows_read, ingest.rows_used
    ));
    out.push_str(&format!(
        "Points: n={} | t=[{:.1}, {:.1}]h | nitrite=[{:.1}, {:.1}]uM\n",
        ingest.stats.n_points,
        ingest.stats.time_min,
        ingest.stats.time_max,
        ingest.stats.nitrite_min,
        ingest.stats.nitrite_max
    ));

    if !ingest.row_errors.is_empty() {
        out.push_str(&format!("\nSkipped rows ({}):\n", ingest.row_errors.len()));
        for e in ingest.row_errors.iter().take(MAX_ROW_ERRORS_SHOWN) {
            out.push_str(&format!("  line {}: {}\n", e.line, e.message));
        }
        let hidden = ingest.row_errors.len().saturating_sub(MAX_ROW_ERRORS_SHOWN);
        if hidden > 0 {
            out.push_str(&format!("  ... and {hidden} more\n"));
        }
    }

    out.push_str("\nSigmoidal fit:\n");
    out.push_str(&format!(
        "- category: {}\n",
        result.fit.category.display_name()
    ));
    match result.fit.category {
        FitCategory::Sigmoidal => {
            out.push_str(&format!("- max      : {:.2} uM\n", result.fit.max_um));
            out.push_str(&format!("- slope    : {:.5} 1/h\n", result.fit.slope_per_h));
            out.push_str(&format!("- midpoint : {:.2} h\n", result.fit.midpoint_h));

            let curve = Logistic {
                max: result.fit.max_um,
                slope: result.fit.slope_per_h,
                midpoint: result.fit.midpoint_h,
            };
            if let Ok(t95) = curve.inverse(0.95 * result.fit.max_um) {
                out.push_str(&format!("- 95% of max at {t95:.1} h\n"));
            }
        }
        FitCategory::Ambiguous => {
            out.push_str(
                "- parameters not reported: the midpoint/slope are not well identified.\n",
            );
        }
        FitCategory::NoSignal => {
            out.push_str("- parameters not reported: the series is essentially flat.\n");
        }
    }
    out.push_str(&format!(
        "- quality  : SSE={:.3} RMSE={:.3}uM n={}\n",
        result.quality.sse, result.quality.rmse, result.quality.n
    ));

    out.push_str("\nSpecific growth rate:\n");
    out.push_str(&format!(
        "- window : [{:.1}, {:.1}] h (n={})\n",
        config.window.start_h, config.window.end_h, growth.n
    ));
    out.push_str(&format!(
        "- mu_max : {:.5} +/- {:.5} 1/h\n",
        growth.mu_max_per_h, growth.std_error
    ));
    out.push_str(&format!("- R^2    : {:.4}\n", growth.r_squared));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExponentialWindow, FitQuality, SigmoidFit};
    use crate::io::ingest::{DatasetStats, RowError};
    use std::path::PathBuf;

    fn fixture() -> (IngestedData, FitResult, GrowthRate, FitConfig) {
        let ingest = IngestedData {
            points: Vec::new(),
            stats: DatasetStats {
                n_points: 6,
                time_min: 0.0,
                time_max: 100.0,
                nitrite_min: 5.0,
                nitrite_max: 800.0,
            },
            row_errors: vec![RowError {
                line: 3,
                message: "Missing/invalid `nitrite` value.".to_string(),
            }],
            rows_read: 7,
            rows_used: 6,
        };
        let result = FitResult {
            fit: SigmoidFit {
                max_um: 810.0,
                slope_per_h: 0.11,
                midpoint_h: 57.0,
                category: FitCategory::Sigmoidal,
            },
            quality: FitQuality {
                sse: 120.0,
                rmse: 4.5,
                n: 6,
            },
        };
        let growth = GrowthRate {
            mu_max_per_h: 0.0569,
            std_error: 0.0021,
            r_squared: 0.998,
            intercept_ln_um: 2.1,
            n: 3,
        };
        let config = FitConfig {
            csv_path: PathBuf::from("nitrite.csv"),
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
            out_dir: PathBuf::from("charts"),
            plot: true,
            plot_width: 900,
            plot_height: 600,
            export_results: None,
            export_fit: None,
        };
        (ingest, result, growth, config)
    }

    #[test]
    fn summary_reports_parameters_for_sigmoidal_fits() {
        let (ingest, result, growth, config) = fixture();
        let s = format_run_summary(&ingest, &result, &growth, &config);
        assert!(s.contains("category: sigmoidal"));
        assert!(s.contains("810.00 uM"));
        assert!(s.contains("95% of max at"));
        assert!(s.contains("mu_max : 0.05690"));
        assert!(s.contains("line 3"));
    }

    #[test]
    fn summary_withholds_parameters_for_no_signal() {
        let (ingest, mut result, growth, config) = fixture();
        result.fit.category = FitCategory::NoSignal;
        let s = format_run_summary(&ingest, &result, &growth, &config);
        assert!(s.contains("category: no-signal"));
        assert!(!s.contains("midpoint :"));
    }
}
