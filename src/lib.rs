//! `se-contrast` library crate.
//!
//! Fits contrast-agent relaxivity from calibration samples and searches an
//! echo-time / repetition-time / concentration grid for the spin-echo
//! protocol with the best SNR efficiency.
//!
//! The binary (`sec`) is a thin wrapper around this library so that the
//! numeric pipeline is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod grid;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod report;
