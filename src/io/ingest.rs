//! CSV ingest and normalization.
//!
//! This module turns an exported assay sheet into a clean, ordered sequence
//! of `Observation`s that are safe to fit and plot.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation**: rows without a usable nitrite value are
//!   skipped, but every skip is recorded and reported, never silent
//! - **Deterministic behavior**: rows come out in file order
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{GenerationSummary, Observation, ObservationRow};
use crate::error::AppError;

/// Summary stats about the observations actually used downstream.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_points: usize,
    pub time_min: f64,
    pub time_max: f64,
    pub nitrite_min: f64,
    pub nitrite_max: f64,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: normalized observations + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub points: Vec<Observation>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load and normalize a CSV file to `Observation`s.
pub fn load_observations(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::usage(format!("Failed to open CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::usage(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(row) => match normalize_row(&row) {
                Ok(point) => points.push(point),
                Err(e) => row_errors.push(RowError { line, message: e }),
            },
            Err(e) => row_errors.push(RowError { line, message: e }),
        }
    }

    let rows_used = points.len();
    let stats = compute_stats(&points).ok_or_else(|| {
        AppError::data("No valid observations remain after normalization.")
    })?;

    Ok(IngestedData {
        points,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns. The trailing '%' handles the `CV%` header.
    let name = name.trim().trim_start_matches('\u{feff}').trim_end_matches('%');
    name.trim().to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    if !header_map.contains_key("time") {
        return Err(AppError::usage("Missing required column: `time`"));
    }
    if !header_map.contains_key("nitrite") {
        return Err(AppError::usage("Missing required column: `nitrite`"));
    }
    Ok(())
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<ObservationRow, String> {
    let time_str = get_required(record, header_map, "time")?;
    let time_h = time_str
        .parse::<f64>()
        .map_err(|_| format!("Invalid `time` value '{time_str}'."))?;

    let replicate = get_optional(record, header_map, "replicate").map(str::to_string);
    let generation = get_optional(record, header_map, "generation").map(str::to_string);

    let nitrite_um = parse_opt_f64(get_optional(record, header_map, "nitrite"));
    let mean_um = parse_opt_f64(get_optional(record, header_map, "mean"));
    // Sheets in the wild spell this column both `StDev` and `StdDev`.
    let stddev_um = parse_opt_f64(
        get_optional(record, header_map, "stddev")
            .or_else(|| get_optional(record, header_map, "stdev")),
    );
    let cv_pct = parse_opt_f64(get_optional(record, header_map, "cv"));

    Ok(ObservationRow {
        time_h,
        replicate,
        generation,
        nitrite_um,
        mean_um,
        stddev_um,
        cv_pct,
    })
}

fn normalize_row(row: &ObservationRow) -> Result<Observation, String> {
    let Some(nitrite_um) = row.nitrite_um else {
        return Err("Missing/invalid `nitrite` value.".to_string());
    };

    if !row.time_h.is_finite() || row.time_h < 0.0 {
        return Err(format!("Invalid `time` value {} (must be >= 0).", row.time_h));
    }
    if nitrite_um < 0.0 {
        return Err(format!(
            "Negative `nitrite` value {nitrite_um} (concentrations are >= 0)."
        ));
    }

    // Aggregate statistics count only when both mean and stddev are present;
    // a lone CV% without them is meaningless for error bars.
    let summary = match (row.mean_um, row.stddev_um) {
        (Some(mean_um), Some(stddev_um)) => Some(GenerationSummary {
            mean_um,
            stddev_um,
            cv_pct: row.cv_pct,
        }),
        _ => None,
    };

    Ok(Observation {
        time_h: row.time_h,
        replicate: row.replicate.clone(),
        generation: row.generation.clone(),
        nitrite_um,
        summary,
    })
}

fn compute_stats(points: &[Observation]) -> Option<DatasetStats> {
    let mut time_min = f64::INFINITY;
    let mut time_max = f64::NEG_INFINITY;
    let mut nitrite_min = f64::INFINITY;
    let mut nitrite_max = f64::NEG_INFINITY;

    for p in points {
        time_min = time_min.min(p.time_h);
        time_max = time_max.max(p.time_h);
        nitrite_min = nitrite_min.min(p.nitrite_um);
        nitrite_max = nitrite_max.max(p.nitrite_um);
    }

    if !time_min.is_finite() || !time_max.is_finite() || !nitrite_min.is_finite() || !nitrite_max.is_finite() {
        return None;
    }

    Some(DatasetStats {
        n_points: points.len(),
        time_min,
        time_max,
        nitrite_min,
        nitrite_max,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?;
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
