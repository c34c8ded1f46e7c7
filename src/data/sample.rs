//! Synthetic nitrite time-series generation.
//!
//! Produces a dataset in the same shape as a real assay export: replicate
//! rows plus one aggregate (mean/stddev/CV) row per generation and time
//! point. Later generations get a shifted midpoint so the per-generation
//! series are visually distinct on the raw chart.
//!
//! Generation is seeded and deterministic: the same spec always produces the
//! same file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{GenerationSummary, Observation};
use crate::error::AppError;
use crate::models::Logistic;

/// Midpoint lag added per generation (hours).
const GENERATION_LAG_H: f64 = 4.0;

/// Parameters of the generated dataset.
#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub seed: u64,
    pub generations: usize,
    pub replicates: usize,
    pub timepoints: usize,
    pub duration_h: f64,
    pub max_um: f64,
    pub slope_per_h: f64,
    pub midpoint_h: f64,
    /// Multiplicative noise as a fraction of the clean value.
    pub noise_fraction: f64,
}

/// Generate observations (replicate rows + aggregate rows) from the spec.
pub fn generate_sample(spec: &SampleSpec) -> Result<Vec<Observation>, AppError> {
    if spec.generations == 0 || spec.replicates == 0 {
        return Err(AppError::usage("Sample generations and replicates must be > 0."));
    }
    if spec.timepoints < 2 {
        return Err(AppError::usage("Sample needs at least 2 time points."));
    }
    if !(spec.duration_h.is_finite() && spec.duration_h > 0.0) {
        return Err(AppError::usage("Sample duration must be > 0."));
    }
    if !(spec.max_um.is_finite() && spec.max_um > 0.0) {
        return Err(AppError::usage("Sample maximum concentration must be > 0."));
    }
    if !(spec.noise_fraction.is_finite() && spec.noise_fraction >= 0.0) {
        return Err(AppError::usage("Sample noise fraction must be >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::numeric(format!("Noise distribution error: {e}")))?;

    let mut points = Vec::new();
    for g in 0..spec.generations {
        let curve = Logistic {
            max: spec.max_um,
            slope: spec.slope_per_h,
            midpoint: spec.midpoint_h + GENERATION_LAG_H * g as f64,
        };
        let generation = format!("G{}", g + 1);

        for i in 0..spec.timepoints {
            let t = spec.duration_h * i as f64 / (spec.timepoints as f64 - 1.0);
            let clean = curve.predict(t);

            let mut values = Vec::with_capacity(spec.replicates);
            for r in 0..spec.replicates {
                let z: f64 = normal.sample(&mut rng);
                let value = (clean * (1.0 + spec.noise_fraction * z)).max(0.0);
                values.push(value);
                points.push(Observation {
                    time_h: t,
                    replicate: Some(format!("R{}", r + 1)),
                    generation: Some(generation.clone()),
                    nitrite_um: value,
                    summary: None,
                });
            }

            let (mean, stddev) = mean_stddev(&values);
            let cv_pct = if mean > 0.0 {
                Some(stddev / mean * 100.0)
            } else {
                None
            };
            points.push(Observation {
                time_h: t,
                replicate: None,
                generation: Some(generation.clone()),
                nitrite_um: mean,
                summary: Some(GenerationSummary {
                    mean_um: mean,
                    stddev_um: stddev,
                    cv_pct,
                }),
            });
        }
    }

    Ok(points)
}

/// Write observations to a CSV in the assay-export schema.
pub fn write_sample_csv(path: &Path, points: &[Observation]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::usage(format!(
            "Failed to create sample CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(file, "time,replicate,generation,nitrite,mean,stddev,cv")
        .map_err(|e| AppError::usage(format!("Failed to write sample CSV header: {e}")))?;

    for p in points {
        let (mean, stddev, cv) = match &p.summary {
            Some(s) => (
                format!("{:.4}", s.mean_um),
                format!("{:.4}", s.stddev_um),
                s.cv_pct.map(|v| format!("{v:.2}")).unwrap_or_default(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        writeln!(
            file,
            "{:.2},{},{},{:.4},{},{},{}",
            p.time_h,
            p.replicate.as_deref().unwrap_or(""),
            p.generation.as_deref().unwrap_or(""),
            p.nitrite_um,
            mean,
            stddev,
            cv,
        )
        .map_err(|e| AppError::usage(format!("Failed to write sample CSV row: {e}")))?;
    }

    Ok(())
}

/// Mean and sample standard deviation (0 for a single value).
fn mean_stddev(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> SampleSpec {
        SampleSpec {
            seed: 42,
            generations: 3,
            replicates: 3,
            timepoints: 12,
            duration_h: 100.0,
            max_um: 800.0,
            slope_per_h: 0.11,
            midpoint_h: 50.0,
            noise_fraction: 0.05,
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate_sample(&spec()).unwrap();
        let b = generate_sample(&spec()).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.nitrite_um, y.nitrite_um);
        }
    }

    #[test]
    fn row_counts_match_spec() {
        let points = generate_sample(&spec()).unwrap();
        // Per generation and time point: replicate rows plus one aggregate row.
        assert_eq!(points.len(), 3 * 12 * (3 + 1));
        let aggregates = points.iter().filter(|p| p.summary.is_some()).count();
        assert_eq!(aggregates, 3 * 12);
    }

    #[test]
    fn values_are_finite_and_non_negative() {
        let points = generate_sample(&spec()).unwrap();
        assert!(points.iter().all(|p| p.nitrite_um.is_finite() && p.nitrite_um >= 0.0));
    }

    #[test]
    fn zero_counts_are_rejected() {
        let mut bad = spec();
        bad.generations = 0;
        assert_eq!(generate_sample(&bad).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn sample_csv_round_trips_through_ingest() {
        let points = generate_sample(&spec()).unwrap();
        let path = std::env::temp_dir().join(format!("growth_sample_{}.csv", std::process::id()));
        write_sample_csv(&path, &points).unwrap();

        let data = crate::io::ingest::load_observations(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(data.points.len(), points.len());
        assert!(data.row_errors.is_empty());
        let aggregates = data.points.iter().filter(|p| p.summary.is_some()).count();
        assert_eq!(aggregates, 3 * 12);
    }
}
