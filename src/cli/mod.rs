//! Command-line parsing for the spin-echo contrast optimizer.
//!
//! Argument parsing and command dispatch stay separate from the numeric code;
//! every flag here is an optional override on top of the config layers.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::io::{AxisOverrides, CalibrationTable, ConfigLayer};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sec", version, about = "Spin-echo SNR-efficiency optimizer for contrast-agent protocols")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable logging.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit relaxivity, search the grid, and print the best TR/concentration per TE.
    Optimize(OptimizeArgs),
    /// Fit relaxivity only and print parameters and calibration residuals.
    Fit(InputArgs),
}

/// Configuration sources shared by all commands.
#[derive(Debug, Args, Clone, Default)]
pub struct InputArgs {
    /// TOML run configuration (axes and/or calibration).
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Calibration CSV with columns `concentration,t1,t2`.
    #[arg(long, value_name = "CSV")]
    pub calibration: Option<PathBuf>,

    /// Calibration concentrations (mM), comma-separated.
    #[arg(long, value_delimiter = ',', requires = "t1", requires = "t2")]
    pub concentrations: Option<Vec<f64>>,

    /// Observed T1 values (ms), comma-separated.
    #[arg(long, value_delimiter = ',', requires = "concentrations")]
    pub t1: Option<Vec<f64>>,

    /// Observed T2 values (ms), comma-separated.
    #[arg(long, value_delimiter = ',', requires = "concentrations")]
    pub t2: Option<Vec<f64>>,
}

/// Options for the full grid search.
#[derive(Debug, Args, Clone, Default)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Minimum echo time (ms).
    #[arg(long)]
    pub te_min: Option<f64>,

    /// Maximum echo time (ms).
    #[arg(long)]
    pub te_max: Option<f64>,

    /// Echo-time step (ms).
    #[arg(long)]
    pub te_step: Option<f64>,

    /// Minimum repetition time (ms).
    #[arg(long)]
    pub tr_min: Option<f64>,

    /// Maximum repetition time (ms).
    #[arg(long)]
    pub tr_max: Option<f64>,

    /// Repetition-time step (ms).
    #[arg(long)]
    pub tr_step: Option<f64>,

    /// Minimum concentration (mM).
    #[arg(long)]
    pub conc_min: Option<f64>,

    /// Maximum concentration (mM).
    #[arg(long)]
    pub conc_max: Option<f64>,

    /// Concentration step (mM).
    #[arg(long)]
    pub conc_step: Option<f64>,

    /// Hide the score column.
    #[arg(long)]
    pub no_score: bool,

    /// Export the optimum table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the full run (fit, axes, curves, optima) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

impl InputArgs {
    /// Calibration given inline with `--concentrations/--t1/--t2`.
    pub fn inline_layer(&self) -> ConfigLayer {
        let calibration = match (&self.concentrations, &self.t1, &self.t2) {
            (Some(c), Some(t1), Some(t2)) => Some(CalibrationTable {
                concentrations: c.clone(),
                t1: t1.clone(),
                t2: t2.clone(),
            }),
            _ => None,
        };
        ConfigLayer {
            calibration,
            ..Default::default()
        }
    }
}

impl OptimizeArgs {
    /// Axis flags as a config layer.
    pub fn axis_layer(&self) -> ConfigLayer {
        ConfigLayer {
            echo_time: AxisOverrides {
                min: self.te_min,
                max: self.te_max,
                step: self.te_step,
            },
            repetition_time: AxisOverrides {
                min: self.tr_min,
                max: self.tr_max,
                step: self.tr_step,
            },
            concentration: AxisOverrides {
                min: self.conc_min,
                max: self.conc_max,
                step: self.conc_step,
            },
            calibration: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_axis_and_inline_calibration_flags() {
        let cli = Cli::parse_from([
            "sec",
            "-vv",
            "optimize",
            "--te-min",
            "10",
            "--conc-step",
            "0.5",
            "--concentrations",
            "0,2,4",
            "--t1",
            "900,300,150",
            "--t2",
            "40,30,20",
            "--no-score",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Optimize(args) = cli.command else {
            panic!("expected optimize");
        };
        assert_eq!(args.te_min, Some(10.0));
        assert!(args.no_score);

        let axis = args.axis_layer();
        assert_eq!(axis.concentration.step, Some(0.5));
        assert_eq!(axis.echo_time.max, None);

        let inline = args.input.inline_layer();
        assert_eq!(inline.calibration.unwrap().t1, vec![900.0, 300.0, 150.0]);
    }

    #[test]
    fn partial_inline_calibration_is_rejected() {
        let res = Cli::try_parse_from(["sec", "fit", "--concentrations", "0,1", "--t1", "100,50"]);
        assert!(res.is_err());
    }
}
