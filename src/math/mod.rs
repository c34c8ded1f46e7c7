//! Mathematical utilities: least-squares solvers.

pub mod linreg;
pub mod ols;

pub use linreg::*;
pub use ols::*;
