//! Shared domain types.
//!
//! Outputs are `Serialize` so they can be exported to JSON/CSV as-is.
//! Inputs are built through validating constructors; nothing downstream
//! re-checks shapes or ranges.

use serde::Serialize;

use crate::error::PipelineError;

/// Relaxation channel: longitudinal (T1) or transverse (T2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Channel {
    T1,
    T2,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::T1, Channel::T2];
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::T1 => write!(f, "T1"),
            Channel::T2 => write!(f, "T2"),
        }
    }
}

/// One calibration measurement: concentration (mM) with observed T1/T2 (ms).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConcentrationSample {
    pub concentration: f64,
    pub t1: f64,
    pub t2: f64,
}

/// Equal-length calibration sequences (at least two samples).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationSet {
    concentrations: Vec<f64>,
    t1: Vec<f64>,
    t2: Vec<f64>,
}

impl CalibrationSet {
    pub fn new(concentrations: Vec<f64>, t1: Vec<f64>, t2: Vec<f64>) -> Result<Self, PipelineError> {
        if concentrations.len() != t1.len() || concentrations.len() != t2.len() {
            return Err(PipelineError::InputShape(format!(
                "sequence lengths differ (concentration={}, T1={}, T2={})",
                concentrations.len(),
                t1.len(),
                t2.len()
            )));
        }
        if concentrations.len() < 2 {
            return Err(PipelineError::InputShape(format!(
                "at least 2 samples are required, got {}",
                concentrations.len()
            )));
        }
        Ok(Self {
            concentrations,
            t1,
            t2,
        })
    }

    pub fn from_samples(samples: &[ConcentrationSample]) -> Result<Self, PipelineError> {
        Self::new(
            samples.iter().map(|s| s.concentration).collect(),
            samples.iter().map(|s| s.t1).collect(),
            samples.iter().map(|s| s.t2).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.concentrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concentrations.is_empty()
    }

    pub fn concentrations(&self) -> &[f64] {
        &self.concentrations
    }

    /// Observed relaxation times for one channel, aligned with `concentrations()`.
    pub fn observed(&self, channel: Channel) -> &[f64] {
        match channel {
            Channel::T1 => &self.t1,
            Channel::T2 => &self.t2,
        }
    }

    pub fn samples(&self) -> impl Iterator<Item = ConcentrationSample> + '_ {
        self.concentrations
            .iter()
            .zip(self.t1.iter().zip(self.t2.iter()))
            .map(|(&concentration, (&t1, &t2))| ConcentrationSample {
                concentration,
                t1,
                t2,
            })
    }
}

/// Which of the three search axes a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AxisKind {
    EchoTime,
    RepetitionTime,
    Concentration,
}

impl AxisKind {
    pub fn display_name(self) -> &'static str {
        match self {
            AxisKind::EchoTime => "echo-time",
            AxisKind::RepetitionTime => "repetition-time",
            AxisKind::Concentration => "concentration",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            AxisKind::EchoTime | AxisKind::RepetitionTime => "ms",
            AxisKind::Concentration => "mM",
        }
    }
}

/// Inclusive `[min, max]` range with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    min: f64,
    max: f64,
}

impl Bounds {
    pub fn new(axis: AxisKind, min: f64, max: f64) -> Result<Self, PipelineError> {
        if !(min.is_finite() && max.is_finite()) {
            return Err(PipelineError::EmptyGrid {
                axis: axis.display_name(),
                reason: format!("range must be finite (min={min}, max={max})"),
            });
        }
        if max < min {
            return Err(PipelineError::EmptyGrid {
                axis: axis.display_name(),
                reason: format!("max < min (min={min}, max={max})"),
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Range plus sampling step for one search axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisSpec {
    kind: AxisKind,
    bounds: Bounds,
    step: f64,
}

impl AxisSpec {
    pub fn new(kind: AxisKind, min: f64, max: f64, step: f64) -> Result<Self, PipelineError> {
        let bounds = Bounds::new(kind, min, max)?;
        if !(step.is_finite() && step > 0.0) {
            return Err(PipelineError::EmptyGrid {
                axis: kind.display_name(),
                reason: format!("step must be finite and > 0 (got {step})"),
            });
        }
        Ok(Self { kind, bounds, step })
    }

    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

/// Ordered, strictly increasing sample points of one axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterAxis {
    pub kind: AxisKind,
    pub values: Vec<f64>,
}

impl ParameterAxis {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Fitted linear rate model for one channel: `rate(c) = r0 + c * ri`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelFit {
    pub channel: Channel,
    /// Baseline rate (1/ms).
    pub r0: f64,
    /// Incremental rate per unit concentration (1/(ms·mM)).
    pub ri: f64,
    /// Residual sum of squares in rate space.
    pub rss: f64,
    pub n_samples: usize,
}

impl ChannelFit {
    /// Baseline relaxation time `1/r0`.
    pub fn t0(&self) -> f64 {
        1.0 / self.r0
    }

    /// `1/ri`; infinite when the channel does not respond to concentration.
    pub fn ti(&self) -> f64 {
        1.0 / self.ri
    }
}

/// Relaxivity fits for both channels. Produced once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RelaxivityParameters {
    pub t1: ChannelFit,
    pub t2: ChannelFit,
}

impl RelaxivityParameters {
    pub fn channel(&self, channel: Channel) -> &ChannelFit {
        match channel {
            Channel::T1 => &self.t1,
            Channel::T2 => &self.t2,
        }
    }
}

/// Predicted relaxation times aligned index-for-index with the concentration axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelaxationCurve {
    pub channel: Channel,
    pub times: Vec<f64>,
}

/// Best `(TR, concentration)` for one echo time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimumRecord {
    pub echo_time: f64,
    pub repetition_time: f64,
    pub concentration: f64,
    pub score: f64,
    #[serde(skip)]
    pub tr_index: usize,
    #[serde(skip)]
    pub conc_index: usize,
}

/// Fully validated run configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizerConfig {
    pub echo_time: AxisSpec,
    pub repetition_time: AxisSpec,
    pub concentration: AxisSpec,
    pub calibration: CalibrationSet,
}

impl OptimizerConfig {
    /// Reference gadolinium phantom protocol used when nothing else is supplied.
    pub fn reference() -> Self {
        Self {
            echo_time: AxisSpec {
                kind: AxisKind::EchoTime,
                bounds: Bounds { min: 15.0, max: 25.0 },
                step: 1.0,
            },
            repetition_time: AxisSpec {
                kind: AxisKind::RepetitionTime,
                bounds: Bounds { min: 50.0, max: 100.0 },
                step: 1.0,
            },
            concentration: AxisSpec {
                kind: AxisKind::Concentration,
                bounds: Bounds { min: 0.0, max: 8.0 },
                step: 0.1,
            },
            calibration: CalibrationSet {
                concentrations: vec![0.0, 4.0, 8.0],
                t1: vec![1000.0, 80.0, 50.0],
                t2: vec![45.0, 21.0, 14.0],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_rejects_unequal_lengths() {
        let err = CalibrationSet::new(vec![0.0, 1.0], vec![10.0, 5.0], vec![3.0]).unwrap_err();
        assert!(matches!(err, PipelineError::InputShape(_)));
    }

    #[test]
    fn calibration_requires_two_samples() {
        let err = CalibrationSet::new(vec![0.0], vec![10.0], vec![3.0]).unwrap_err();
        assert!(matches!(err, PipelineError::InputShape(_)));

        let err = CalibrationSet::new(vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, PipelineError::InputShape(_)));
    }

    #[test]
    fn calibration_samples_align() {
        let set = CalibrationSet::new(vec![0.0, 2.0], vec![900.0, 120.0], vec![40.0, 25.0]).unwrap();
        let samples: Vec<_> = set.samples().collect();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].concentration, 2.0);
        assert_eq!(samples[1].t1, 120.0);
        assert_eq!(samples[1].t2, 25.0);
        assert_eq!(set.observed(Channel::T2), &[40.0, 25.0]);
    }

    #[test]
    fn bounds_reject_inverted_range() {
        let err = Bounds::new(AxisKind::EchoTime, 10.0, 5.0).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyGrid { axis: "echo-time", .. }));
        assert!(Bounds::new(AxisKind::EchoTime, 5.0, 5.0).is_ok());
    }

    #[test]
    fn axis_spec_rejects_non_positive_step() {
        for step in [0.0, -1.0, f64::NAN] {
            let err = AxisSpec::new(AxisKind::Concentration, 0.0, 1.0, step).unwrap_err();
            assert!(matches!(err, PipelineError::EmptyGrid { .. }));
        }
    }
}
