//! Logistic growth-curve model.
//!
//! The model is implemented as small, pure functions so that fitting/search
//! code can stay generic over parameters.

pub mod model;

pub use model::*;
