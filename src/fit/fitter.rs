//! Low-level sigmoid fitting routines.
//!
//! Given ordered `(time, nitrite)` observations we fit
//!
//! ```text
//! N(t) = max / (1 + exp(-slope * (t - midpoint)))
//! ```
//!
//! by least squares. For each candidate `(slope, midpoint)` pair from the
//! grid, the saturation level is linear in the model and solved in closed
//! form; the best (lowest SSE) candidate is then polished by a damped
//! Gauss-Newton iteration over all three parameters.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::{FitConfig, FitQuality, FitResult, Observation, SigmoidFit};
use crate::error::AppError;
use crate::fit::category::judge;
use crate::fit::grid::{candidate_grid, infer_slope_direction};
use crate::math::solve_least_squares;
use crate::models::{Logistic, unit_sigmoid};

/// Three parameters plus at least one residual degree of freedom.
const MIN_POINTS: usize = 4;

/// Stop refining once the relative SSE improvement drops below this.
const REFINE_REL_TOL: f64 = 1e-12;

/// Fitted parameters with their objective value.
#[derive(Debug, Clone)]
pub struct ModelFit {
    pub params: Logistic,
    pub sse: f64,
    pub rmse: f64,
}

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    params: Logistic,
    sse: f64,
}

/// Fit the sigmoid and attach the categorical fit judgment.
pub fn fit_sigmoid(points: &[Observation], config: &FitConfig) -> Result<FitResult, AppError> {
    let fit = fit_params(points, config)?;
    let times: Vec<f64> = points.iter().map(|p| p.time_h).collect();
    let values: Vec<f64> = points.iter().map(|p| p.nitrite_um).collect();
    let category = judge(&times, &values, &fit.params, config);

    Ok(FitResult {
        fit: SigmoidFit {
            max_um: fit.params.max,
            slope_per_h: fit.params.slope,
            midpoint_h: fit.params.midpoint,
            category,
        },
        quality: FitQuality {
            sse: fit.sse,
            rmse: fit.rmse,
            n: points.len(),
        },
    })
}

/// Grid search + Gauss-Newton polish, without the categorical judgment.
pub fn fit_params(points: &[Observation], config: &FitConfig) -> Result<ModelFit, AppError> {
    if points.len() < MIN_POINTS {
        return Err(AppError::data(format!(
            "Sigmoid fit needs at least {MIN_POINTS} observations, got {}.",
            points.len()
        )));
    }

    let times: Vec<f64> = points.iter().map(|p| p.time_h).collect();
    let values: Vec<f64> = points.iter().map(|p| p.nitrite_um).collect();

    if times.iter().any(|t| !t.is_finite()) || values.iter().any(|v| !v.is_finite()) {
        return Err(AppError::data("Non-finite observation in fit input."));
    }

    let t_min = times.iter().copied().fold(f64::INFINITY, f64::min);
    let t_max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let direction = infer_slope_direction(&times, &values);
    let grid = candidate_grid(
        config.slope_min,
        config.slope_max,
        config.slope_steps,
        config.midpoint_steps,
        t_min,
        t_max,
        direction,
    )?;

    let best = search_grid(&grid, &times, &values)?;
    let refined = refine(best.params, best.sse, &times, &values, config.refine_iters);

    let rmse = (refined.1 / times.len() as f64).sqrt();
    Ok(ModelFit {
        params: refined.0,
        sse: refined.1,
        rmse,
    })
}

fn search_grid(grid: &[(f64, f64)], times: &[f64], values: &[f64]) -> Result<Candidate, AppError> {
    // Evaluate each candidate pair independently (parallel).
    let candidates: Vec<Candidate> = grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, &(slope, midpoint))| {
            evaluate_candidate(slope, midpoint, times, values).map(|(params, sse)| Candidate {
                idx,
                params,
                sse,
            })
        })
        .collect();

    if candidates.is_empty() {
        return Err(AppError::numeric(
            "No valid sigmoid fit candidates on the search grid.",
        ));
    }

    // Deterministic selection: pick the minimum SSE; break ties by grid index.
    let mut best = &candidates[0];
    for c in &candidates[1..] {
        if c.sse < best.sse || (c.sse == best.sse && c.idx < best.idx) {
            best = c;
        }
    }

    Ok(best.clone())
}

fn evaluate_candidate(
    slope: f64,
    midpoint: f64,
    times: &[f64],
    values: &[f64],
) -> Option<(Logistic, f64)> {
    let n = times.len();

    // With (slope, midpoint) fixed the model is `max * u(t)`: one linear
    // coefficient against the unit-sigmoid design column.
    let mut design = DMatrix::<f64>::zeros(n, 1);
    let mut y = DVector::<f64>::zeros(n);
    for i in 0..n {
        design[(i, 0)] = unit_sigmoid(slope, midpoint, times[i]);
        y[i] = values[i];
    }

    let beta = solve_least_squares(&design, &y)?;
    let params = Logistic {
        max: beta[0],
        slope,
        midpoint,
    };

    let sse = compute_sse(&params, times, values);
    if sse.is_finite() { Some((params, sse)) } else { None }
}

/// Damped Gauss-Newton polish of all three parameters.
///
/// Each iteration solves the linearized residual system for a step and
/// halves the step until the SSE decreases; a step that cannot decrease the
/// SSE ends the refinement. The grid-search result is always kept as a
/// fallback, so refinement can only improve the fit.
fn refine(start: Logistic, start_sse: f64, times: &[f64], values: &[f64], iters: usize) -> (Logistic, f64) {
    let n = times.len();
    let mut params = start;
    let mut sse = start_sse;

    for _ in 0..iters {
        let mut jacobian = DMatrix::<f64>::zeros(n, 3);
        let mut residual = DVector::<f64>::zeros(n);
        for i in 0..n {
            let g = params.gradient(times[i]);
            jacobian[(i, 0)] = g[0];
            jacobian[(i, 1)] = g[1];
            jacobian[(i, 2)] = g[2];
            residual[i] = values[i] - params.predict(times[i]);
        }

        let Some(step) = solve_least_squares(&jacobian, &residual) else {
            break;
        };

        let mut accepted = None;
        let mut scale = 1.0;
        for _ in 0..8 {
            let trial = Logistic {
                max: params.max + scale * step[0],
                slope: params.slope + scale * step[1],
                midpoint: params.midpoint + scale * step[2],
            };
            let trial_sse = compute_sse(&trial, times, values);
            if trial_sse.is_finite() && trial_sse < sse {
                accepted = Some((trial, trial_sse));
                break;
            }
            scale *= 0.5;
        }

        let Some((next, next_sse)) = accepted else {
            break;
        };

        let improvement = (sse - next_sse) / sse.max(f64::MIN_POSITIVE);
        params = next;
        sse = next_sse;
        if improvement < REFINE_REL_TOL {
            break;
        }
    }

    (params, sse)
}

fn compute_sse(params: &Logistic, times: &[f64], values: &[f64]) -> f64 {
    times
        .iter()
        .zip(values.iter())
        .map(|(&t, &v)| {
            let r = v - params.predict(t);
            r * r
        })
        .sum()
}
