//! Two-stage reduction of the score tensor to one optimum per echo time.
//!
//! 1. For each `(te, tr)`: max over concentration, remembering the index.
//! 2. For each `te`: max of stage 1 over repetition time, then look up the
//!    concentration index stored for the winning cell.
//!
//! Maximizing over `c` then over `tr` is the same as the joint maximum over
//! `(tr, c)`. Ties resolve to the lowest concentration index in stage 1 and
//! the lowest repetition-time index in stage 2, i.e. lexicographic order.

use tracing::{debug, info, instrument};

use crate::domain::{OptimumRecord, RelaxationCurve};
use crate::error::PipelineError;
use crate::grid::{ScoreTensor, SearchGrid, build_score_tensor};
use crate::math::argmax_first;

/// Stage 1 output: best score and its concentration index per `(te, tr)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationReduction {
    n_te: usize,
    n_tr: usize,
    best_scores: Vec<f64>,
    best_conc: Vec<usize>,
}

impl ConcentrationReduction {
    pub fn best_score(&self, te: usize, tr: usize) -> f64 {
        self.best_scores[te * self.n_tr + tr]
    }

    pub fn best_conc_index(&self, te: usize, tr: usize) -> usize {
        self.best_conc[te * self.n_tr + tr]
    }

    /// Stage 1 scores across the repetition-time axis for one echo time.
    pub fn scores_for(&self, te: usize) -> &[f64] {
        &self.best_scores[te * self.n_tr..(te + 1) * self.n_tr]
    }

    /// `(|TE|, |TR|)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_te, self.n_tr)
    }
}

/// Winning `(tr, c)` indices for one echo-time slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceArgmax {
    pub tr_index: usize,
    pub conc_index: usize,
}

/// Stage 1: maximum over the concentration axis for every `(te, tr)` pair.
pub fn reduce_over_concentration(tensor: &ScoreTensor) -> Result<ConcentrationReduction, PipelineError> {
    let (n_te, n_tr, _) = tensor.shape();
    let mut best_scores = Vec::with_capacity(n_te * n_tr);
    let mut best_conc = Vec::with_capacity(n_te * n_tr);

    for te in 0..n_te {
        for tr in 0..n_tr {
            let (idx, score) = argmax_first(tensor.row(te, tr)).ok_or_else(|| no_finite_score(te))?;
            best_scores.push(score);
            best_conc.push(idx);
        }
    }

    Ok(ConcentrationReduction {
        n_te,
        n_tr,
        best_scores,
        best_conc,
    })
}

/// Stage 2: maximum over repetition time per echo time.
pub fn reduce_over_repetition(reduction: &ConcentrationReduction) -> Result<Vec<SliceArgmax>, PipelineError> {
    (0..reduction.n_te)
        .map(|te| -> Result<SliceArgmax, PipelineError> {
            let (tr_index, _) = argmax_first(reduction.scores_for(te)).ok_or_else(|| no_finite_score(te))?;
            Ok(SliceArgmax {
                tr_index,
                conc_index: reduction.best_conc_index(te, tr_index),
            })
        })
        .collect()
}

/// Single-stage argmax over the whole `(tr, c)` sub-array of one echo time.
pub fn joint_argmax(tensor: &ScoreTensor, te: usize) -> Option<SliceArgmax> {
    let (_, _, n_c) = tensor.shape();
    let (flat, _) = argmax_first(tensor.slice(te))?;
    Some(SliceArgmax {
        tr_index: flat / n_c,
        conc_index: flat % n_c,
    })
}

/// Reduce a score tensor to one `OptimumRecord` per echo time, in axis order.
pub fn find_optima(grid: &SearchGrid, tensor: &ScoreTensor) -> Result<Vec<OptimumRecord>, PipelineError> {
    if tensor.shape() != grid.shape() {
        return Err(PipelineError::InputShape(format!(
            "score tensor shape {:?} does not match grid shape {:?}",
            tensor.shape(),
            grid.shape()
        )));
    }

    let reduction = reduce_over_concentration(tensor)?;
    let winners = reduce_over_repetition(&reduction)?;

    Ok(winners
        .into_iter()
        .enumerate()
        .map(|(te, w)| OptimumRecord {
            echo_time: grid.echo_time.values[te],
            repetition_time: grid.repetition_time.values[w.tr_index],
            concentration: grid.concentration.values[w.conc_index],
            score: reduction.best_score(te, w.tr_index),
            tr_index: w.tr_index,
            conc_index: w.conc_index,
        })
        .collect())
}

/// Score the full grid and extract the per-echo-time optima.
#[instrument(skip_all, fields(shape = ?grid.shape()))]
pub fn optimize(
    grid: &SearchGrid,
    t1_curve: &RelaxationCurve,
    t2_curve: &RelaxationCurve,
) -> Result<Vec<OptimumRecord>, PipelineError> {
    let tensor = build_score_tensor(grid, t1_curve, t2_curve)?;
    debug!(points = tensor.shape().0 * tensor.shape().1 * tensor.shape().2, "score tensor built");

    let optima = find_optima(grid, &tensor)?;
    info!(rows = optima.len(), "grid search complete");
    Ok(optima)
}

fn no_finite_score(te: usize) -> PipelineError {
    debug!(te, "no finite score in echo-time slice");
    PipelineError::Domain {
        quantity: "score",
        value: f64::NAN,
    }
}
