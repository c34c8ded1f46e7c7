//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A raw row of CSV inputs (mostly optional).
///
/// This mirrors the input sheet schema and lets us perform row-level
/// validation with good error messages before normalizing.
#[derive(Debug, Clone)]
pub struct ObservationRow {
    pub time_h: f64,
    pub replicate: Option<String>,
    pub generation: Option<String>,
    pub nitrite_um: Option<f64>,
    pub mean_um: Option<f64>,
    pub stddev_um: Option<f64>,
    pub cv_pct: Option<f64>,
}

/// Per-generation aggregate statistics carried on summary rows.
///
/// Only rows that average the replicates of one generation have these; they
/// feed the error bars on the raw activity chart.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    pub mean_um: f64,
    pub stddev_um: f64,
    pub cv_pct: Option<f64>,
}

/// A normalized observation used for fitting and plotting.
///
/// Invariant: `nitrite_um` is finite for every retained observation. Rows
/// without a usable nitrite value never become `Observation`s.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Sample time in hours since inoculation.
    pub time_h: f64,
    /// Replicate identifier, when the row belongs to a single replicate.
    pub replicate: Option<String>,
    /// Culture generation label (e.g. "G3").
    pub generation: Option<String>,
    /// Nitrite concentration in uM.
    pub nitrite_um: f64,
    /// Aggregate statistics, present only on generation-summary rows.
    pub summary: Option<GenerationSummary>,
}

/// Categorical judgment of a sigmoidal fit.
///
/// Downstream code must branch on this before using the curve parameters:
/// only a `Sigmoidal` fit has a meaningful maximum and midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitCategory {
    /// The data supports a saturating S-shaped curve.
    Sigmoidal,
    /// A curve was fitted but its midpoint or slope is not well identified.
    Ambiguous,
    /// The series is essentially flat; there is no meaningful maximum.
    NoSignal,
}

impl FitCategory {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            FitCategory::Sigmoidal => "sigmoidal",
            FitCategory::Ambiguous => "ambiguous",
            FitCategory::NoSignal => "no-signal",
        }
    }
}

/// Fitted logistic curve `N(t) = max / (1 + exp(-slope * (t - midpoint)))`.
///
/// Produced once per dataset; immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigmoidFit {
    /// Saturation level (uM).
    pub max_um: f64,
    /// Steepness at the midpoint (1/h). Positive for rising curves.
    pub slope_per_h: f64,
    /// Time of half-saturation (h).
    pub midpoint_h: f64,
    /// Fit-quality gate; see [`FitCategory`].
    pub category: FitCategory,
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
}

/// Fit output: curve parameters plus diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub fit: SigmoidFit,
    pub quality: FitQuality,
}

/// Analyst-chosen exponential-phase time window (inclusive bounds, hours).
///
/// There is no automatic phase detection: the bounds come from visual
/// inspection of the raw chart and are passed in explicitly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExponentialWindow {
    pub start_h: f64,
    pub end_h: f64,
}

impl ExponentialWindow {
    pub fn contains(&self, time_h: f64) -> bool {
        time_h >= self.start_h && time_h <= self.end_h
    }
}

/// Specific growth rate estimate from the log-linear regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthRate {
    /// Slope of ln(nitrite) vs time over the window (1/h).
    pub mu_max_per_h: f64,
    /// Standard error of the slope.
    pub std_error: f64,
    /// Coefficient of determination of the regression.
    pub r_squared: f64,
    /// Regression intercept: ln of the extrapolated t=0 concentration.
    pub intercept_ln_um: f64,
    /// Number of observations in the window.
    pub n: usize,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub csv_path: PathBuf,
    pub window: ExponentialWindow,

    /// Minimum observed dynamic range, as a fraction of the observed maximum,
    /// for the series to count as having a meaningful saturation level.
    pub min_signal_fraction: f64,
    /// How far outside the observed time span (as a fraction of the span) the
    /// fitted midpoint may fall before the fit is judged ambiguous.
    pub midpoint_tolerance: f64,

    /// Slope-magnitude grid bounds (1/h) for the candidate search.
    pub slope_min: f64,
    pub slope_max: f64,
    pub slope_steps: usize,
    /// Midpoint candidates across the observed time span.
    pub midpoint_steps: usize,
    /// Gauss-Newton polish iterations after the grid search.
    pub refine_iters: usize,

    pub out_dir: PathBuf,
    pub plot: bool,
    pub plot_width: u32,
    pub plot_height: u32,

    pub export_results: Option<PathBuf>,
    pub export_fit: Option<PathBuf>,
}

/// A saved fit file (JSON).
///
/// The "portable" representation of one analysis run: curve parameters,
/// diagnostics, the growth-rate estimate, and a precomputed curve grid for
/// quick re-plotting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub generated: NaiveDate,
    pub fit: SigmoidFit,
    pub quality: FitQuality,
    pub window: ExponentialWindow,
    pub growth: Option<GrowthRate>,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub time_h: Vec<f64>,
    pub nitrite_um: Vec<f64>,
}
