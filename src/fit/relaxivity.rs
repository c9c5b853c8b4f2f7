//! Linear relaxivity fit for a single channel.
//!
//! Given:
//! - concentrations `c_i`
//! - observed relaxation times `T_i`
//!
//! we regress rates `1/T_i` on `[1, c_i]` to obtain `rate(c) = r0 + c · ri`.
//! T1 and T2 are fitted independently with the same procedure.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::{CalibrationSet, Channel, ChannelFit, RelaxivityParameters};
use crate::error::PipelineError;
use crate::math::{residual_sum_of_squares, solve_least_squares};

/// Fit both channels from a calibration set.
pub fn fit_relaxivity(calibration: &CalibrationSet) -> Result<RelaxivityParameters, PipelineError> {
    let t1 = fit_channel(Channel::T1, calibration.concentrations(), calibration.observed(Channel::T1))?;
    let t2 = fit_channel(Channel::T2, calibration.concentrations(), calibration.observed(Channel::T2))?;
    Ok(RelaxivityParameters { t1, t2 })
}

/// Fit `rate(c) = r0 + c · ri` for one channel.
pub fn fit_channel(
    channel: Channel,
    concentrations: &[f64],
    observed: &[f64],
) -> Result<ChannelFit, PipelineError> {
    if concentrations.len() != observed.len() {
        return Err(PipelineError::InputShape(format!(
            "{channel}: {} concentrations vs {} observations",
            concentrations.len(),
            observed.len()
        )));
    }
    if concentrations.len() < 2 {
        return Err(PipelineError::InputShape(format!(
            "{channel}: at least 2 samples are required, got {}",
            concentrations.len()
        )));
    }

    let not_converged = |reason: String| PipelineError::FitConvergence { channel, reason };

    if let Some(c) = concentrations.iter().find(|c| !c.is_finite()) {
        return Err(not_converged(format!("non-finite concentration {c}")));
    }
    // A zero or negative time has no finite positive rate.
    if let Some(t) = observed.iter().find(|t| !(t.is_finite() && **t > 0.0)) {
        return Err(not_converged(format!("observed time {t} is not finite and > 0")));
    }
    if count_distinct(concentrations) < 2 {
        return Err(not_converged(
            "at least 2 distinct concentration values are required".to_string(),
        ));
    }

    let n = concentrations.len();
    let mut x = DMatrix::<f64>::zeros(n, 2);
    let mut y = DVector::<f64>::zeros(n);
    for (i, (&c, &t)) in concentrations.iter().zip(observed.iter()).enumerate() {
        x[(i, 0)] = 1.0;
        x[(i, 1)] = c;
        y[i] = 1.0 / t;
    }

    let beta = solve_least_squares(&x, &y)
        .ok_or_else(|| not_converged("design matrix is singular".to_string()))?;
    let rss = residual_sum_of_squares(&x, &y, &beta);

    let fit = ChannelFit {
        channel,
        r0: beta[0],
        ri: beta[1],
        rss,
        n_samples: n,
    };
    debug!(%channel, r0 = fit.r0, ri = fit.ri, rss = fit.rss, "relaxivity fit");
    Ok(fit)
}

fn count_distinct(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted.len()
}
