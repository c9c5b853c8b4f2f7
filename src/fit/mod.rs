//! Relaxivity fitting.
//!
//! Responsibilities:
//!
//! - convert observed relaxation times to rates
//! - solve the linear rate model per channel
//! - report fit diagnostics (RSS, sample count)

pub mod relaxivity;

pub use relaxivity::*;
