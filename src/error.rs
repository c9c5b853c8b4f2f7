//! Error types.
//!
//! - `PipelineError`: failures of the numeric core (fit, curves, scoring, grid).
//! - `AppError`: what the binary reports, carrying a process exit code.

use thiserror::Error;

use crate::domain::Channel;

/// Failures detected by the numeric core.
///
/// Every variant is a deterministic function of the input; nothing here is
/// retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Calibration sequences of unequal length, or fewer than two samples.
    #[error("Invalid calibration input: {0}")]
    InputShape(String),

    /// The relaxivity regression could not produce finite parameters.
    #[error("Relaxivity fit for {channel} did not converge: {reason}")]
    FitConvergence { channel: Channel, reason: String },

    /// A non-positive or non-finite value reached the score evaluator.
    #[error("Domain error: {quantity} must be finite and > 0 (got {value})")]
    Domain { quantity: &'static str, value: f64 },

    /// An axis range or step that cannot produce a non-empty axis.
    #[error("Empty {axis} axis: {reason}")]
    EmptyGrid { axis: &'static str, reason: String },
}

impl PipelineError {
    /// Exit code used when this error terminates the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::InputShape(_) | PipelineError::EmptyGrid { .. } => 2,
            PipelineError::FitConvergence { .. } => 3,
            PipelineError::Domain { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
