//! Command-line parsing for the growth-curve analyzer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "growth",
    version,
    about = "Nitrite growth-curve fitter and specific-growth-rate estimator"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the sigmoid, estimate mu_max, render charts, and optionally export.
    Fit(FitArgs),
    /// Re-render the model chart from a previously exported fit JSON.
    Plot(PlotArgs),
    /// Generate a seeded synthetic dataset CSV (for demos and tests).
    Sample(SampleArgs),
}

/// Options for the full analysis run.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Input CSV (columns: time, replicate, generation, nitrite, mean, stddev, cv).
    pub csv: PathBuf,

    /// Exponential-phase window start (hours, inclusive).
    #[arg(long)]
    pub window_start: f64,

    /// Exponential-phase window end (hours, inclusive).
    #[arg(long)]
    pub window_end: f64,

    /// Minimum observed dynamic range, as a fraction of the observed maximum,
    /// below which the series is judged to have no signal.
    #[arg(long, default_value_t = 0.2)]
    pub min_signal_fraction: f64,

    /// How far outside the observed time span (fraction of the span) the
    /// fitted midpoint may fall before the fit is judged ambiguous.
    #[arg(long, default_value_t = 0.25)]
    pub midpoint_tolerance: f64,

    /// Minimum slope magnitude (1/h) for the candidate grid.
    #[arg(long, default_value_t = 0.005)]
    pub slope_min: f64,

    /// Maximum slope magnitude (1/h) for the candidate grid.
    #[arg(long, default_value_t = 2.0)]
    pub slope_max: f64,

    /// Slope grid steps (log-spaced).
    #[arg(long, default_value_t = 40)]
    pub slope_steps: usize,

    /// Midpoint grid steps across the observed time span.
    #[arg(long, default_value_t = 40)]
    pub midpoint_steps: usize,

    /// Gauss-Newton polish iterations after the grid search.
    #[arg(long, default_value_t = 25)]
    pub refine_iters: usize,

    /// Output directory for the chart SVGs.
    #[arg(long, default_value = "charts")]
    pub out_dir: PathBuf,

    /// Skip chart rendering.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (pixels).
    #[arg(long, default_value_t = 900)]
    pub width: u32,

    /// Chart height (pixels).
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Export per-observation results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export fit (params + quality + sampled curve) to JSON.
    #[arg(long = "export-fit")]
    pub export_fit: Option<PathBuf>,
}

/// Options for re-plotting a saved fit.
#[derive(Debug, Parser, Clone)]
pub struct PlotArgs {
    /// Fit JSON produced by `growth fit --export-fit`.
    pub fit: PathBuf,

    /// Output SVG path.
    #[arg(long, default_value = "fitted_curve.svg")]
    pub out: PathBuf,

    /// Chart width (pixels).
    #[arg(long, default_value_t = 900)]
    pub width: u32,

    /// Chart height (pixels).
    #[arg(long, default_value_t = 600)]
    pub height: u32,
}

/// Options for synthetic dataset generation.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(long, default_value = "sample.csv")]
    pub out: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of culture generations.
    #[arg(long, default_value_t = 3)]
    pub generations: usize,

    /// Replicates per generation and time point.
    #[arg(long, default_value_t = 3)]
    pub replicates: usize,

    /// Sampling time points per generation.
    #[arg(long, default_value_t = 12)]
    pub timepoints: usize,

    /// Assay duration (hours).
    #[arg(long, default_value_t = 100.0)]
    pub duration: f64,

    /// True saturation level (uM).
    #[arg(long, default_value_t = 800.0)]
    pub max: f64,

    /// True sigmoid slope (1/h).
    #[arg(long, default_value_t = 0.11)]
    pub slope: f64,

    /// True sigmoid midpoint (hours) of the first generation.
    #[arg(long, default_value_t = 50.0)]
    pub midpoint: f64,

    /// Multiplicative noise fraction.
    #[arg(long, default_value_t = 0.05)]
    pub noise: f64,
}
