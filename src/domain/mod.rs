//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - normalized observations (`Observation`, `GenerationSummary`)
//! - fit outputs (`SigmoidFit`, `FitCategory`, `FitResult`, `FitQuality`)
//! - the regression window and its result (`ExponentialWindow`, `GrowthRate`)
//! - run configuration (`FitConfig`) and the saved-fit schema (`FitFile`)

pub mod types;

pub use types::*;
