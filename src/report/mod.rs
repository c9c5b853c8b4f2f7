//! Reporting utilities: calibration residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{CalibrationSet, Channel, RelaxivityParameters};
use crate::error::PipelineError;
use crate::models::relaxation_time;

/// Observed vs fitted relaxation time for one calibration sample and channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationResidual {
    pub channel: Channel,
    pub concentration: f64,
    pub observed: f64,
    pub fitted: f64,
    pub residual: f64,
}

/// Compute fitted times and residuals (ms) for every calibration sample, T1 first.
pub fn compute_calibration_residuals(
    calibration: &CalibrationSet,
    params: &RelaxivityParameters,
) -> Result<Vec<CalibrationResidual>, PipelineError> {
    let mut out = Vec::with_capacity(calibration.len() * 2);
    for channel in Channel::ALL {
        let fit = params.channel(channel);
        for (&c, &observed) in calibration
            .concentrations()
            .iter()
            .zip(calibration.observed(channel).iter())
        {
            let fitted = relaxation_time(fit, c);
            if !fitted.is_finite() {
                return Err(PipelineError::Domain {
                    quantity: "fitted relaxation time",
                    value: fitted,
                });
            }
            out.push(CalibrationResidual {
                channel,
                concentration: c,
                observed,
                fitted,
                residual: observed - fitted,
            });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::fit_relaxivity;

    #[test]
    fn exact_two_point_fit_has_zero_residuals() {
        let calibration =
            CalibrationSet::new(vec![0.0, 5.0], vec![1200.0, 150.0], vec![60.0, 20.0]).unwrap();
        let params = fit_relaxivity(&calibration).unwrap();
        let residuals = compute_calibration_residuals(&calibration, &params).unwrap();

        assert_eq!(residuals.len(), 4);
        assert_eq!(residuals[0].channel, Channel::T1);
        assert_eq!(residuals[3].channel, Channel::T2);
        for r in residuals {
            assert!(r.residual.abs() < 1e-6 * r.observed, "{r:?}");
        }
    }
}
