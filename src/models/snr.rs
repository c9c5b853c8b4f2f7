//! Spin-echo SNR efficiency.
//!
//! ```text
//! score = exp(-TE/T2) · (1 - exp(-TR/T1) · (2·exp(TE/(2·T1)) - 1)) / sqrt(TR)
//! ```
//!
//! The numerator is the spin-echo signal with incomplete T1 recovery and T2
//! decay; dividing by `sqrt(TR)` gives signal per square-root scan time.

use crate::error::PipelineError;

/// SNR efficiency for one `(TR, TE, T1, T2)` tuple.
///
/// Rejects non-positive `TR`, `T1`, `T2` and any input that would make the
/// score non-finite.
pub fn spin_echo_efficiency(tr: f64, te: f64, t1: f64, t2: f64) -> Result<f64, PipelineError> {
    ensure_positive("TR", tr)?;
    ensure_positive("T1", t1)?;
    ensure_positive("T2", t2)?;
    if !te.is_finite() {
        return Err(PipelineError::Domain {
            quantity: "TE",
            value: te,
        });
    }

    let score = spin_echo_efficiency_unchecked(tr, te, t1, t2);
    if score.is_finite() {
        Ok(score)
    } else {
        Err(PipelineError::Domain {
            quantity: "score",
            value: score,
        })
    }
}

/// Same formula without guards, for callers that validated their inputs.
#[inline]
pub fn spin_echo_efficiency_unchecked(tr: f64, te: f64, t1: f64, t2: f64) -> f64 {
    let decay = (-te / t2).exp();
    let recovery = 1.0 - (-tr / t1).exp() * (2.0 * (te / (2.0 * t1)).exp() - 1.0);
    decay * recovery / tr.sqrt()
}

fn ensure_positive(quantity: &'static str, value: f64) -> Result<(), PipelineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PipelineError::Domain { quantity, value })
    }
}
