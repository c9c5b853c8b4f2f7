//! Run configuration layering.
//!
//! Precedence, lowest first:
//!
//! 1. built-in reference protocol (`OptimizerConfig::reference`)
//! 2. TOML file (`--config`)
//! 3. calibration CSV (`--calibration`)
//! 4. individual CLI flags
//!
//! Each layer is a `ConfigLayer` of optional overrides. Layers are merged
//! field by field first; validation happens once, when the merged values are
//! turned back into an `OptimizerConfig`. A `min` from one layer and a `max`
//! from another are therefore only checked against each other.
//!
//! ```toml
//! [echo_time]
//! min = 15.0
//! max = 25.0
//! step = 1.0
//!
//! [calibration]
//! concentrations = [0.0, 4.0, 8.0]
//! t1 = [1000.0, 80.0, 50.0]
//! t2 = [45.0, 21.0, 14.0]
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::domain::{AxisSpec, CalibrationSet, Channel, OptimizerConfig};
use crate::error::{AppError, PipelineError};

/// Optional overrides for one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisOverrides {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

impl AxisOverrides {
    /// Fields set in `over` replace those in `self`.
    pub fn merge(self, over: AxisOverrides) -> AxisOverrides {
        AxisOverrides {
            min: over.min.or(self.min),
            max: over.max.or(self.max),
            step: over.step.or(self.step),
        }
    }

    fn apply(&self, base: &AxisSpec) -> Result<AxisSpec, PipelineError> {
        let bounds = base.bounds();
        AxisSpec::new(
            base.kind(),
            self.min.unwrap_or(bounds.min()),
            self.max.unwrap_or(bounds.max()),
            self.step.unwrap_or(base.step()),
        )
    }
}

/// Raw calibration sequences as written in a config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalibrationTable {
    pub concentrations: Vec<f64>,
    pub t1: Vec<f64>,
    pub t2: Vec<f64>,
}

impl From<&CalibrationSet> for CalibrationTable {
    fn from(set: &CalibrationSet) -> Self {
        Self {
            concentrations: set.concentrations().to_vec(),
            t1: set.observed(Channel::T1).to_vec(),
            t2: set.observed(Channel::T2).to_vec(),
        }
    }
}

/// One configuration source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    #[serde(default)]
    pub echo_time: AxisOverrides,
    #[serde(default)]
    pub repetition_time: AxisOverrides,
    #[serde(default)]
    pub concentration: AxisOverrides,
    pub calibration: Option<CalibrationTable>,
}

impl ConfigLayer {
    /// Merge `over` on top of this layer without validating anything.
    pub fn merge(self, over: &ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            echo_time: self.echo_time.merge(over.echo_time),
            repetition_time: self.repetition_time.merge(over.repetition_time),
            concentration: self.concentration.merge(over.concentration),
            calibration: over.calibration.clone().or(self.calibration),
        }
    }

    /// Apply this layer on top of `base`, validating the result.
    pub fn apply(&self, base: &OptimizerConfig) -> Result<OptimizerConfig, PipelineError> {
        let calibration = match &self.calibration {
            Some(table) => CalibrationSet::new(
                table.concentrations.clone(),
                table.t1.clone(),
                table.t2.clone(),
            )?,
            None => base.calibration.clone(),
        };
        Ok(OptimizerConfig {
            echo_time: self.echo_time.apply(&base.echo_time)?,
            repetition_time: self.repetition_time.apply(&base.repetition_time)?,
            concentration: self.concentration.apply(&base.concentration)?,
            calibration,
        })
    }
}

/// Merge layers in order, then validate once on top of the reference protocol.
pub fn resolve_config(layers: &[ConfigLayer]) -> Result<OptimizerConfig, PipelineError> {
    layers
        .iter()
        .fold(ConfigLayer::default(), |merged, layer| merged.merge(layer))
        .apply(&OptimizerConfig::reference())
}

/// Parse a TOML configuration layer.
pub fn parse_config_toml(content: &str) -> Result<ConfigLayer, AppError> {
    toml::from_str(content).map_err(|e| AppError::new(2, format!("Invalid config TOML: {e}")))
}

/// Read a TOML configuration layer from disk.
pub fn load_config_toml(path: &Path) -> Result<ConfigLayer, AppError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to read config '{}': {e}", path.display()),
        )
    })?;
    parse_config_toml(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_layers_give_reference() {
        assert_eq!(resolve_config(&[]).unwrap(), OptimizerConfig::reference());
        assert_eq!(
            resolve_config(&[ConfigLayer::default()]).unwrap(),
            OptimizerConfig::reference()
        );
    }

    #[test]
    fn toml_overrides_are_partial() {
        let layer = parse_config_toml(
            r#"
            [repetition_time]
            max = 200.0

            [calibration]
            concentrations = [0.0, 2.0]
            t1 = [900.0, 150.0]
            t2 = [40.0, 28.0]
            "#,
        )
        .unwrap();
        let config = resolve_config(&[layer]).unwrap();

        assert_eq!(config.repetition_time.bounds().min(), 50.0);
        assert_eq!(config.repetition_time.bounds().max(), 200.0);
        assert_eq!(config.echo_time, OptimizerConfig::reference().echo_time);
        assert_eq!(config.calibration.len(), 2);
    }

    #[test]
    fn later_layers_win() {
        let a = ConfigLayer {
            echo_time: AxisOverrides { min: Some(10.0), max: Some(30.0), step: None },
            ..Default::default()
        };
        let b = ConfigLayer {
            echo_time: AxisOverrides { min: Some(12.0), ..Default::default() },
            ..Default::default()
        };
        let config = resolve_config(&[a, b]).unwrap();
        assert_eq!(config.echo_time.bounds().min(), 12.0);
        assert_eq!(config.echo_time.bounds().max(), 30.0);
    }

    #[test]
    fn bounds_split_across_layers_are_checked_together() {
        // [30, 25] would be invalid on its own; the merged [30, 40] is not.
        let file = ConfigLayer {
            echo_time: AxisOverrides { min: Some(30.0), ..Default::default() },
            ..Default::default()
        };
        let flags = ConfigLayer {
            echo_time: AxisOverrides { max: Some(40.0), ..Default::default() },
            ..Default::default()
        };
        let config = resolve_config(&[file, flags]).unwrap();
        assert_eq!(config.echo_time.bounds().min(), 30.0);
        assert_eq!(config.echo_time.bounds().max(), 40.0);
    }

    #[test]
    fn later_calibration_replaces_earlier() {
        let table = |t2: f64| CalibrationTable {
            concentrations: vec![0.0, 1.0],
            t1: vec![900.0, 300.0],
            t2: vec![40.0, t2],
        };
        let a = ConfigLayer { calibration: Some(table(30.0)), ..Default::default() };
        let b = ConfigLayer { calibration: Some(table(20.0)), ..Default::default() };
        let config = resolve_config(&[a, b, ConfigLayer::default()]).unwrap();
        assert_eq!(config.calibration.observed(Channel::T2), &[40.0, 20.0]);
    }

    #[test]
    fn invalid_merged_range_is_rejected() {
        let layer = ConfigLayer {
            concentration: AxisOverrides { max: Some(-1.0), ..Default::default() },
            ..Default::default()
        };
        assert!(matches!(
            resolve_config(&[layer]),
            Err(PipelineError::EmptyGrid { axis: "concentration", .. })
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_config_toml("[echo_time]\nmaximum = 3.0\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "[concentration]\nstep = 0.5\n").unwrap();
        let config = resolve_config(&[load_config_toml(&path).unwrap()]).unwrap();
        assert_eq!(config.concentration.step(), 0.5);
    }
}
