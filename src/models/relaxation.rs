//! Concentration-dependent relaxation times.
//!
//! From `rate(c) = r0 + c · ri` and `t0 = 1/r0`, `ti = 1/ri`:
//!
//! ```text
//! time(c) = t0 · ti / (ti + t0 · c)
//! ```
//!
//! which equals `1 / (r0 + c · ri)` without forming the rate first. When a
//! reciprocal or the product `t0 · ti` leaves the finite range (`r0 == 0`,
//! `ri == 0`, subnormal rates) the rate form is used instead.

use crate::domain::{ChannelFit, RelaxationCurve};

/// Predicted relaxation time at concentration `c`.
pub fn relaxation_time(fit: &ChannelFit, c: f64) -> f64 {
    let t0 = fit.t0();
    let ti = fit.ti();
    if t0.is_finite() && ti.is_finite() {
        let time = t0 * ti / (ti + t0 * c);
        if time.is_finite() {
            return time;
        }
    }
    1.0 / (fit.r0 + c * fit.ri)
}

/// Relaxation curve over the given concentration axis values.
pub fn relaxation_curve(fit: &ChannelFit, concentrations: &[f64]) -> RelaxationCurve {
    RelaxationCurve {
        channel: fit.channel,
        times: concentrations
            .iter()
            .map(|&c| relaxation_time(fit, c))
            .collect(),
    }
}
