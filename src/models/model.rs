//! Logistic curve evaluation.
//!
//! The fitter relies on three primitive operations:
//! - evaluate the unit sigmoid for a candidate `(slope, midpoint)` (the design
//!   column of the linear amplitude solve)
//! - predict `N(t)` given full parameters (for residuals/plots)
//! - evaluate the parameter gradient (for Gauss-Newton polish)
//!
//! The algebraic inverse is also here; it is only defined strictly between 0
//! and the saturation level.

use crate::error::AppError;

/// Logistic curve parameters: `N(t) = max / (1 + exp(-slope * (t - midpoint)))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Logistic {
    pub max: f64,
    pub slope: f64,
    pub midpoint: f64,
}

/// Evaluate the unit sigmoid `1 / (1 + exp(-slope * (t - midpoint)))`.
///
/// Numerical note: the naive form overflows `exp` for strongly negative
/// arguments, so we branch on the sign and evaluate the algebraically
/// equivalent `e^z / (1 + e^z)` on the negative side.
pub fn unit_sigmoid(slope: f64, midpoint: f64, t: f64) -> f64 {
    let z = slope * (t - midpoint);
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Logistic {
    /// Predict `N(t)`.
    pub fn predict(&self, t: f64) -> f64 {
        self.max * unit_sigmoid(self.slope, self.midpoint, t)
    }

    /// Invert the curve: the time at which it reaches concentration `n`.
    ///
    /// Defined only for `0 < n < max` (and a nonzero slope); anything else has
    /// no preimage and is reported as an error rather than a NaN.
    pub fn inverse(&self, n: f64) -> Result<f64, AppError> {
        if !(self.max > 0.0) {
            return Err(AppError::numeric(
                "Curve inversion requires a positive saturation level.",
            ));
        }
        if self.slope == 0.0 {
            return Err(AppError::numeric("Curve inversion requires a nonzero slope."));
        }
        if !(n > 0.0 && n < self.max) {
            return Err(AppError::numeric(format!(
                "Concentration {n:.4} uM is outside the invertible range (0, {:.4}).",
                self.max
            )));
        }
        Ok(self.midpoint - (self.max / n - 1.0).ln() / self.slope)
    }

    /// Partial derivatives of `N(t)` w.r.t. `(max, slope, midpoint)`.
    pub fn gradient(&self, t: f64) -> [f64; 3] {
        let s = unit_sigmoid(self.slope, self.midpoint, t);
        let bell = self.max * s * (1.0 - s);
        [s, bell * (t - self.midpoint), -bell * self.slope]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> Logistic {
        Logistic {
            max: 800.0,
            slope: 0.11,
            midpoint: 55.0,
        }
    }

    #[test]
    fn midpoint_is_half_max() {
        let c = curve();
        assert!((c.predict(c.midpoint) - c.max / 2.0).abs() < 1e-9);
    }

    #[test]
    fn inverse_round_trips() {
        let c = curve();
        for n in [1.0, 80.0, 400.0, 780.0, 799.0] {
            let t = c.inverse(n).unwrap();
            assert!(
                (c.predict(t) - n).abs() < 1e-6,
                "round trip failed at n={n}"
            );
        }
    }

    #[test]
    fn inverse_rejects_out_of_range() {
        let c = curve();
        assert!(c.inverse(0.0).is_err());
        assert!(c.inverse(-5.0).is_err());
        assert!(c.inverse(c.max).is_err());
        assert!(c.inverse(c.max + 1.0).is_err());
    }

    #[test]
    fn monotone_by_slope_sign() {
        let times: Vec<f64> = (0..120).map(|i| i as f64).collect();

        let rising = curve();
        for w in times.windows(2) {
            assert!(rising.predict(w[1]) > rising.predict(w[0]));
        }

        let falling = Logistic {
            slope: -0.11,
            ..curve()
        };
        for w in times.windows(2) {
            assert!(falling.predict(w[1]) < falling.predict(w[0]));
        }

        let flat = Logistic {
            slope: 0.0,
            ..curve()
        };
        for w in times.windows(2) {
            assert_eq!(flat.predict(w[1]), flat.predict(w[0]));
        }
    }

    #[test]
    fn sigmoid_saturates_without_overflow() {
        assert!((unit_sigmoid(1.0, 0.0, 1e4) - 1.0).abs() < 1e-12);
        assert!(unit_sigmoid(1.0, 0.0, -1e4) >= 0.0);
        assert!(unit_sigmoid(1.0, 0.0, -1e4) < 1e-12);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let c = curve();
        let t = 48.0;
        let g = c.gradient(t);
        let h = 1e-6;

        let d_max = (Logistic { max: c.max + h, ..c }.predict(t) - c.predict(t)) / h;
        let d_slope = (Logistic {
            slope: c.slope + h,
            ..c
        }
        .predict(t)
            - c.predict(t))
            / h;
        let d_mid = (Logistic {
            midpoint: c.midpoint + h,
            ..c
        }
        .predict(t)
            - c.predict(t))
            / h;

        assert!((g[0] - d_max).abs() < 1e-4);
        assert!((g[1] - d_slope).abs() < 1e-2);
        assert!((g[2] - d_mid).abs() < 1e-2);
    }
}
