//! Axis generation.
//!
//! An axis samples `min + i · step` for `i = 0..n` with
//! `n = ceil((max - min)/step) + 1`, so the last point is `>= max`:
//!
//! - exactly `max` when the span is a multiple of the step (the final point
//!   is snapped to `max` to absorb rounding)
//! - otherwise past `max` by less than one step
//!
//! `min == max` gives a single point.

use crate::domain::{AxisKind, AxisSpec, OptimizerConfig, ParameterAxis};
use crate::error::PipelineError;

/// Relative slack (in steps) when deciding whether the span is a whole number of steps.
const STEP_TOL: f64 = 1e-9;

/// Upper bound on points per axis; the score tensor is cubic in this.
pub const MAX_AXIS_POINTS: usize = 1_000_000;

/// Upper bound on `|TE| · |TR| · |c|` (one `f64` score per point).
pub const MAX_GRID_POINTS: usize = 50_000_000;

/// Build the sample points for one axis.
pub fn build_axis(spec: &AxisSpec) -> Result<ParameterAxis, PipelineError> {
    let kind = spec.kind();
    let bounds = spec.bounds();
    let step = spec.step();

    let steps = (bounds.span() / step - STEP_TOL).ceil().max(0.0);
    if !steps.is_finite() || steps >= MAX_AXIS_POINTS as f64 {
        return Err(PipelineError::EmptyGrid {
            axis: kind.display_name(),
            reason: format!(
                "step {step} over [{}, {}] exceeds {MAX_AXIS_POINTS} points",
                bounds.min(),
                bounds.max()
            ),
        });
    }
    let n = steps as usize + 1;

    let mut values: Vec<f64> = (0..n).map(|i| bounds.min() + step * i as f64).collect();
    if let Some(last) = values.last_mut() {
        if (*last - bounds.max()).abs() <= STEP_TOL * step {
            *last = bounds.max();
        }
    }

    if values.windows(2).any(|w| w[1] <= w[0]) {
        return Err(PipelineError::EmptyGrid {
            axis: kind.display_name(),
            reason: format!("step {step} is below floating-point resolution at {}", bounds.min()),
        });
    }

    Ok(ParameterAxis { kind, values })
}

/// The three search axes, built once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchGrid {
    pub echo_time: ParameterAxis,
    pub repetition_time: ParameterAxis,
    pub concentration: ParameterAxis,
}

impl SearchGrid {
    pub fn from_config(config: &OptimizerConfig) -> Result<Self, PipelineError> {
        let grid = Self {
            echo_time: build_axis(&config.echo_time)?,
            repetition_time: build_axis(&config.repetition_time)?,
            concentration: build_axis(&config.concentration)?,
        };
        grid.point_count()?;
        Ok(grid)
    }

    /// Total number of grid points, rejected above `MAX_GRID_POINTS`.
    pub fn point_count(&self) -> Result<usize, PipelineError> {
        let (n_te, n_tr, n_c) = self.shape();
        n_te.checked_mul(n_tr)
            .and_then(|n| n.checked_mul(n_c))
            .filter(|&n| n <= MAX_GRID_POINTS)
            .ok_or_else(|| PipelineError::EmptyGrid {
                axis: "search grid",
                reason: format!(
                    "shape ({n_te}, {n_tr}, {n_c}) exceeds {MAX_GRID_POINTS} points"
                ),
            })
    }

    pub fn axis(&self, kind: AxisKind) -> &ParameterAxis {
        match kind {
            AxisKind::EchoTime => &self.echo_time,
            AxisKind::RepetitionTime => &self.repetition_time,
            AxisKind::Concentration => &self.concentration,
        }
    }

    /// `(|TE|, |TR|, |c|)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (
            self.echo_time.len(),
            self.repetition_time.len(),
            self.concentration.len(),
        )
    }
}
