//! Calibration CSV ingest.
//!
//! Expected columns (case-insensitive, any order, extra columns ignored):
//!
//! ```text
//! concentration,t1,t2
//! 0,1000,45
//! 4,80,21
//! ```
//!
//! `conc` is accepted for `concentration`. Every row must parse; a bad row
//! fails the whole file with its line number.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{CalibrationSet, ConcentrationSample};
use crate::error::AppError;

/// Load calibration samples from a CSV file.
pub fn load_calibration_csv(path: &Path) -> Result<CalibrationSet, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open calibration CSV '{}': {e}", path.display()),
        )
    })?;
    read_calibration_csv(file)
}

/// Parse calibration samples from any CSV reader.
pub fn read_calibration_csv<R: Read>(input: R) -> Result<CalibrationSet, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read calibration CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let conc_col = column(&header_map, &["concentration", "conc"])?;
    let t1_col = column(&header_map, &["t1"])?;
    let t2_col = column(&header_map, &["t2"])?;

    let mut samples = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line; CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(2, format!("Calibration CSV line {line}: {e}")))?;
        samples.push(ConcentrationSample {
            concentration: parse_field(&record, conc_col, "concentration", line)?,
            t1: parse_field(&record, t1_col, "t1", line)?,
            t2: parse_field(&record, t2_col, "t2", line)?,
        });
    }

    Ok(CalibrationSet::from_samples(&samples)?)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Strip a UTF-8 BOM left on the first header by spreadsheet exports.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn column(header_map: &HashMap<String, usize>, names: &[&str]) -> Result<usize, AppError> {
    names
        .iter()
        .find_map(|n| header_map.get(*n).copied())
        .ok_or_else(|| {
            AppError::new(
                2,
                format!("Calibration CSV is missing required column `{}`.", names[0]),
            )
        })
}

fn parse_field(record: &StringRecord, col: usize, name: &str, line: usize) -> Result<f64, AppError> {
    let raw = record
        .get(col)
        .ok_or_else(|| AppError::new(2, format!("Calibration CSV line {line}: missing `{name}` value.")))?;
    raw.parse::<f64>().map_err(|_| {
        AppError::new(
            2,
            format!("Calibration CSV line {line}: invalid `{name}` value '{raw}'."),
        )
    })
}
