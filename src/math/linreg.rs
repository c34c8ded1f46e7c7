//! Closed-form simple linear regression.
//!
//! Ordinary least squares of `y` on `x` with the textbook formulas. This is
//! the workhorse behind the specific-growth-rate estimate, where `y` is
//! ln(nitrite) and the slope is reported as `mu_max` with its standard error.
//!
//! Degenerate inputs fail explicitly: a slope computed from fewer than two
//! distinct x values is meaningless and must never leak out as a number.

use crate::error::AppError;

/// Variance floor below which the x values are treated as a single point.
const X_VARIANCE_EPS: f64 = 1e-12;

/// Result of a simple OLS fit `y = intercept + slope * x`.
#[derive(Debug, Clone)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Standard error of the slope; 0 when the fit is exact (n == 2).
    pub slope_std_error: f64,
    pub r_squared: f64,
    pub n: usize,
}

/// Fit `y = intercept + slope * x` by ordinary least squares.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LinearFit, AppError> {
    if x.len() != y.len() {
        return Err(AppError::numeric(format!(
            "Regression input length mismatch: {} x values vs {} y values.",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < 2 {
        return Err(AppError::data(format!(
            "Regression needs at least 2 observations, got {n}."
        )));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(AppError::data("Non-finite value in regression input."));
    }

    let n_f = n as f64;
    let x_bar = x.iter().sum::<f64>() / n_f;
    let y_bar = y.iter().sum::<f64>() / n_f;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - x_bar;
        sxx += dx * dx;
        sxy += dx * (yi - y_bar);
    }

    if sxx <= X_VARIANCE_EPS {
        return Err(AppError::data(
            "Regression needs at least 2 distinct x values (zero time variance).",
        ));
    }

    let slope = sxy / sxx;
    let intercept = y_bar - slope * x_bar;

    let mut sse = 0.0;
    let mut sst = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let r = yi - (intercept + slope * xi);
        sse += r * r;
        let dy = yi - y_bar;
        sst += dy * dy;
    }

    // With two points the line interpolates exactly: SSE is numerically ~0 and
    // there are no residual degrees of freedom, so the standard error is 0 and
    // R^2 is 1 by definition.
    let slope_std_error = if n > 2 {
        ((sse / (n_f - 2.0)) / sxx).sqrt()
    } else {
        0.0
    };

    let r_squared = if sst > 0.0 {
        (1.0 - sse / sst).clamp(0.0, 1.0)
    } else if sse <= 1e-12 {
        1.0
    } else {
        0.0
    };

    Ok(LinearFit {
        slope,
        intercept,
        slope_std_error,
        r_squared,
        n,
    })
}
