//! Export optimum rows to CSV and full runs to JSON.
//!
//! The CSV is meant for spreadsheets; the JSON carries everything needed to
//! re-plot a run (fit parameters, axes, relaxation curves, optima).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::RunOutput;
use crate::domain::{OptimumRecord, ParameterAxis, RelaxationCurve, RelaxivityParameters};
use crate::error::AppError;

/// Write optimum rows as CSV to any writer.
pub fn write_optima_csv<W: Write>(out: W, optima: &[OptimumRecord], show_score: bool) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["echo_time_ms", "repetition_time_ms", "concentration_mm"];
    if show_score {
        header.push("score");
    }
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for o in optima {
        let mut row = vec![
            format!("{}", o.echo_time),
            format!("{}", o.repetition_time),
            format!("{:.6}", o.concentration),
        ];
        if show_score {
            row.push(format!("{:.10e}", o.score));
        }
        writer
            .write_record(&row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write optimum rows to a CSV file.
pub fn write_optima_csv_file(path: &Path, optima: &[OptimumRecord], show_score: bool) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_optima_csv(file, optima, show_score)
}

/// JSON schema of an exported run.
#[derive(Debug, Serialize)]
pub struct RunFile<'a> {
    pub tool: &'static str,
    pub relaxivity: &'a RelaxivityParameters,
    pub echo_time: &'a ParameterAxis,
    pub repetition_time: &'a ParameterAxis,
    pub concentration: &'a ParameterAxis,
    pub t1_curve: &'a RelaxationCurve,
    pub t2_curve: &'a RelaxationCurve,
    pub optima: &'a [OptimumRecord],
}

impl<'a> From<&'a RunOutput> for RunFile<'a> {
    fn from(run: &'a RunOutput) -> Self {
        Self {
            tool: "sec",
            relaxivity: &run.params,
            echo_time: &run.grid.echo_time,
            repetition_time: &run.grid.repetition_time,
            concentration: &run.grid.concentration,
            t1_curve: &run.t1_curve,
            t2_curve: &run.t2_curve,
            optima: &run.optima,
        }
    }
}

/// Write a run JSON file.
pub fn write_run_json(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create run JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &RunFile::from(run))
        .map_err(|e| AppError::new(2, format!("Failed to write run JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_pipeline;
    use crate::domain::OptimizerConfig;

    fn record(te: f64, tr: f64, c: f64, score: f64) -> OptimumRecord {
        OptimumRecord {
            echo_time: te,
            repetition_time: tr,
            concentration: c,
            score,
            tr_index: 0,
            conc_index: 0,
        }
    }

    #[test]
    fn csv_has_optional_score_column() {
        let optima = [record(15.0, 100.0, 5.0, 0.0309), record(16.0, 100.0, 4.9, 0.0291)];

        let mut with = Vec::new();
        write_optima_csv(&mut with, &optima, true).unwrap();
        let with = String::from_utf8(with).unwrap();
        let mut lines = with.lines();
        assert_eq!(lines.next(), Some("echo_time_ms,repetition_time_ms,concentration_mm,score"));
        assert!(lines.next().unwrap().starts_with("15,100,5.000000,"));

        let mut without = Vec::new();
        write_optima_csv(&mut without, &optima, false).unwrap();
        let without = String::from_utf8(without).unwrap();
        assert_eq!(without.lines().nth(2), Some("16,100,4.900000"));
    }

    #[test]
    fn run_json_round_trips_as_value() {
        let run = run_pipeline(&OptimizerConfig::reference()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        write_run_json(&path, &run).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["tool"], "sec");
        assert_eq!(value["optima"].as_array().unwrap().len(), 11);
        assert_eq!(value["concentration"]["values"].as_array().unwrap().len(), 81);
        assert!(value["relaxivity"]["t1"]["r0"].as_f64().unwrap() > 0.0);
    }
}
