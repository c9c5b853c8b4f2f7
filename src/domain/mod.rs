//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - calibration input (`CalibrationSet`, `ConcentrationSample`)
//! - validated axis configuration (`Bounds`, `AxisSpec`, `OptimizerConfig`)
//! - fit and search outputs (`RelaxivityParameters`, `RelaxationCurve`, `OptimumRecord`)

pub mod types;

pub use types::*;
