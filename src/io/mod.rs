//! Input/output helpers.
//!
//! - calibration CSV ingest (`calibration`)
//! - TOML run configuration and layering (`config`)
//! - optimum table / run exports (CSV/JSON) (`export`)

pub mod calibration;
pub mod config;
pub mod export;

pub use calibration::*;
pub use config::*;
pub use export::*;
