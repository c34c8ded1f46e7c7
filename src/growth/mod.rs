//! Exponential-phase windowing and growth-rate estimation.

pub mod rate;
pub mod window;

pub use rate::*;
pub use window::*;
