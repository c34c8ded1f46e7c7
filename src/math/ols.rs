//! Linear least squares solver.
//!
//! The sigmoid fitter repeatedly solves small least-squares problems:
//!
//! - the saturation level is linear in the model given fixed `(slope, midpoint)`,
//!   so the grid search solves a one-column system per candidate
//! - each Gauss-Newton polish step solves a three-column system against the
//!   current residuals
//!
//! Implementation choices:
//! - We use SVD to solve the least-squares problem robustly even when the
//!   design matrix is tall (many observations, 1-3 columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - With at most three columns, SVD performance is irrelevant here.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Near-saturated or near-flat candidates can make the design column almost
    // constant, so try progressively looser tolerances before giving up.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
