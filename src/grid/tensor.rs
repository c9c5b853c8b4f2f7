//! Dense score tensor indexed by `(te, tr, c)`.
//!
//! Storage is a flat row-major `Vec<f64>` (concentration fastest). The tensor is
//! built once and only read afterwards.

use crate::domain::RelaxationCurve;
use crate::error::PipelineError;
use crate::grid::SearchGrid;
use crate::models::spin_echo_efficiency;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTensor {
    n_te: usize,
    n_tr: usize,
    n_c: usize,
    data: Vec<f64>,
}

impl ScoreTensor {
    /// Wrap precomputed scores laid out as `[te][tr][c]`.
    pub fn from_raw(n_te: usize, n_tr: usize, n_c: usize, data: Vec<f64>) -> Result<Self, PipelineError> {
        if n_te == 0 || n_tr == 0 || n_c == 0 {
            return Err(PipelineError::EmptyGrid {
                axis: "score tensor",
                reason: format!("shape ({n_te}, {n_tr}, {n_c}) has an empty dimension"),
            });
        }
        if data.len() != n_te * n_tr * n_c {
            return Err(PipelineError::InputShape(format!(
                "score tensor of shape ({n_te}, {n_tr}, {n_c}) needs {} values, got {}",
                n_te * n_tr * n_c,
                data.len()
            )));
        }
        Ok(Self { n_te, n_tr, n_c, data })
    }

    /// `(|TE|, |TR|, |c|)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.n_te, self.n_tr, self.n_c)
    }

    /// Score at one grid point.
    ///
    /// # Panics
    /// Panics if any index is out of range.
    pub fn score_at(&self, te: usize, tr: usize, c: usize) -> f64 {
        assert!(te < self.n_te && tr < self.n_tr && c < self.n_c, "score tensor index out of range");
        self.data[(te * self.n_tr + tr) * self.n_c + c]
    }

    /// Scores across the concentration axis for one `(te, tr)` pair.
    pub fn row(&self, te: usize, tr: usize) -> &[f64] {
        let start = (te * self.n_tr + tr) * self.n_c;
        &self.data[start..start + self.n_c]
    }

    /// The `(tr, c)` sub-array for one echo time, row-major over `tr`.
    pub fn slice(&self, te: usize) -> &[f64] {
        let len = self.n_tr * self.n_c;
        &self.data[te * len..(te + 1) * len]
    }
}

/// Evaluate the SNR efficiency at every `(te, tr, c)` grid point.
///
/// T1/T2 come from the curves at the concentration index; they do not depend on
/// TE or TR.
pub fn build_score_tensor(
    grid: &SearchGrid,
    t1_curve: &RelaxationCurve,
    t2_curve: &RelaxationCurve,
) -> Result<ScoreTensor, PipelineError> {
    let (n_te, n_tr, n_c) = grid.shape();
    for curve in [t1_curve, t2_curve] {
        if curve.times.len() != n_c {
            return Err(PipelineError::InputShape(format!(
                "{} curve has {} points but the concentration axis has {n_c}",
                curve.channel,
                curve.times.len()
            )));
        }
    }

    let mut data = Vec::with_capacity(grid.point_count()?);
    for &te in grid.echo_time.values() {
        for &tr in grid.repetition_time.values() {
            for (&t1, &t2) in t1_curve.times.iter().zip(t2_curve.times.iter()) {
                data.push(spin_echo_efficiency(tr, te, t1, t2)?);
            }
        }
    }

    ScoreTensor::from_raw(n_te, n_tr, n_c, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AxisKind, Channel, ParameterAxis};
    use crate::models::spin_echo_efficiency_unchecked;

    fn small_grid() -> SearchGrid {
        SearchGrid {
            echo_time: ParameterAxis { kind: AxisKind::EchoTime, values: vec![10.0, 20.0] },
            repetition_time: ParameterAxis { kind: AxisKind::RepetitionTime, values: vec![50.0, 75.0, 100.0] },
            concentration: ParameterAxis { kind: AxisKind::Concentration, values: vec![0.0, 1.0] },
        }
    }

    fn curve(channel: Channel, times: Vec<f64>) -> RelaxationCurve {
        RelaxationCurve { channel, times }
    }

    #[test]
    fn layout_matches_axes() {
        let grid = small_grid();
        let t1 = curve(Channel::T1, vec![800.0, 300.0]);
        let t2 = curve(Channel::T2, vec![60.0, 40.0]);
        let tensor = build_score_tensor(&grid, &t1, &t2).unwrap();

        assert_eq!(tensor.shape(), (2, 3, 2));
        let expected = spin_echo_efficiency_unchecked(75.0, 20.0, 300.0, 40.0);
        assert_eq!(tensor.score_at(1, 1, 1), expected);
        assert_eq!(tensor.row(1, 1)[1], expected);
        assert_eq!(tensor.slice(1)[3], expected);
    }

    #[test]
    fn curve_length_mismatch_is_rejected() {
        let grid = small_grid();
        let t1 = curve(Channel::T1, vec![800.0]);
        let t2 = curve(Channel::T2, vec![60.0, 40.0]);
        assert!(matches!(
            build_score_tensor(&grid, &t1, &t2),
            Err(PipelineError::InputShape(_))
        ));
    }

    #[test]
    fn non_positive_relaxation_time_is_a_domain_error() {
        let grid = small_grid();
        let t1 = curve(Channel::T1, vec![800.0, -5.0]);
        let t2 = curve(Channel::T2, vec![60.0, 40.0]);
        assert!(matches!(
            build_score_tensor(&grid, &t1, &t2),
            Err(PipelineError::Domain { quantity: "T1", .. })
        ));
    }

    #[test]
    fn oversized_grid_fails_without_allocating() {
        let axis = |kind| ParameterAxis { kind, values: (0..1000).map(|i| 1.0 + i as f64).collect() };
        let grid = SearchGrid {
            echo_time: axis(AxisKind::EchoTime),
            repetition_time: axis(AxisKind::RepetitionTime),
            concentration: axis(AxisKind::Concentration),
        };
        let t1 = curve(Channel::T1, vec![800.0; 1000]);
        let t2 = curve(Channel::T2, vec![60.0; 1000]);
        assert!(matches!(
            build_score_tensor(&grid, &t1, &t2),
            Err(PipelineError::EmptyGrid { axis: "search grid", .. })
        ));
    }

    #[test]
    fn from_raw_checks_length() {
        assert!(ScoreTensor::from_raw(1, 2, 2, vec![0.0; 3]).is_err());
        assert!(ScoreTensor::from_raw(0, 2, 2, vec![]).is_err());
    }
}
