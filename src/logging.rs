//! `tracing` subscriber setup for the binary.
//!
//! The library only emits events; installing a subscriber is the binary's job.
//! Logs go to stderr so stdout stays a clean report.

use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

use crate::error::AppError;

/// Map `-v` count / `-q` to a level filter.
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global subscriber.
pub fn setup_logging(verbosity: u8, quiet: bool) -> Result<(), AppError> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(level_filter(verbosity, quiet))
        .with(stderr_layer)
        .try_init()
        .map_err(|e| AppError::new(1, format!("Failed to initialize logging: {e}")))
}
