//! Shared pipeline logic used by the `optimize` and `fit` commands.
//!
//! calibration -> relaxivity fit -> relaxation curves -> score tensor -> optima
//!
//! Every stage is a pure function of its inputs; the commands only differ in
//! how far down the chain they go and what they print.

use tracing::{info, instrument};

use crate::domain::{Channel, OptimizerConfig, OptimumRecord, RelaxationCurve, RelaxivityParameters};
use crate::error::PipelineError;
use crate::fit::fit_relaxivity;
use crate::grid::{SearchGrid, optimize};
use crate::models::relaxation_curve;

/// All computed outputs of a single optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub config: OptimizerConfig,
    pub params: RelaxivityParameters,
    pub grid: SearchGrid,
    pub t1_curve: RelaxationCurve,
    pub t2_curve: RelaxationCurve,
    pub optima: Vec<OptimumRecord>,
}

/// Execute the full pipeline.
#[instrument(skip_all)]
pub fn run_pipeline(config: &OptimizerConfig) -> Result<RunOutput, PipelineError> {
    // 1) Fit relaxivity per channel.
    let params = fit_relaxivity(&config.calibration)?;
    info!(
        t1_r0 = params.t1.r0,
        t1_ri = params.t1.ri,
        t2_r0 = params.t2.r0,
        t2_ri = params.t2.ri,
        "relaxivity fitted"
    );

    // 2) Build axes.
    let grid = SearchGrid::from_config(config)?;
    info!(shape = ?grid.shape(), "search grid built");

    // 3) Relaxation curves over the concentration axis.
    let t1_curve = relaxation_curve(params.channel(Channel::T1), grid.concentration.values());
    let t2_curve = relaxation_curve(params.channel(Channel::T2), grid.concentration.values());

    // 4) Score and reduce.
    let optima = optimize(&grid, &t1_curve, &t2_curve)?;

    Ok(RunOutput {
        config: config.clone(),
        params,
        grid,
        t1_curve,
        t2_curve,
        optima,
    })
}
