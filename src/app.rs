//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - resolves the run configuration from its layers
//! - runs the fit / grid-search pipeline
//! - prints reports and writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{Command, InputArgs, OptimizeArgs};
use crate::domain::OptimizerConfig;
use crate::error::AppError;
use crate::io::{ConfigLayer, load_calibration_csv, load_config_toml, resolve_config};

pub mod pipeline;

/// Entry point for the `sec` binary.
pub fn run() -> Result<(), AppError> {
    // `sec` and `sec --te-min 10 ...` behave like `sec optimize ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    crate::logging::setup_logging(cli.verbose, cli.quiet)?;

    match cli.command {
        Command::Optimize(args) => handle_optimize(args),
        Command::Fit(args) => handle_fit(args),
    }
}

fn handle_optimize(args: OptimizeArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.input, Some(args.axis_layer()))?;
    let run = pipeline::run_pipeline(&config)?;

    println!("{}", crate::report::format_run(&run, !args.no_score));

    if let Some(path) = &args.export {
        crate::io::write_optima_csv_file(path, &run.optima, !args.no_score)?;
        info!(path = %path.display(), "optimum table exported");
    }
    if let Some(path) = &args.export_json {
        crate::io::write_run_json(path, &run)?;
        info!(path = %path.display(), "run exported");
    }

    Ok(())
}

fn handle_fit(args: InputArgs) -> Result<(), AppError> {
    let config = config_from_args(&args, None)?;
    let params = crate::fit::fit_relaxivity(&config.calibration)?;
    let residuals = crate::report::compute_calibration_residuals(&config.calibration, &params)?;

    println!("{}", crate::report::format_fit_summary(&params));
    println!(
        "{}",
        crate::report::format_calibration_table(&config.calibration, &residuals)
    );
    Ok(())
}

/// Merge config file, calibration CSV, inline calibration and axis flags, in that order.
pub fn config_from_args(input: &InputArgs, axis_layer: Option<ConfigLayer>) -> Result<OptimizerConfig, AppError> {
    let mut layers = Vec::new();

    if let Some(path) = &input.config {
        layers.push(load_config_toml(path)?);
    }
    if let Some(path) = &input.calibration {
        let set = load_calibration_csv(path)?;
        layers.push(ConfigLayer {
            calibration: Some((&set).into()),
            ..Default::default()
        });
    }
    layers.push(input.inline_layer());
    layers.extend(axis_layer);

    Ok(resolve_config(&layers)?)
}

/// Rewrite argv so `sec` defaults to `sec optimize`.
///
/// Rules:
/// - `sec`                      -> `sec optimize`
/// - `sec --te-min 10 ...`      -> `sec optimize --te-min 10 ...`
/// - `sec --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("optimize".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "optimize" | "fit");
    if is_subcommand {
        return argv;
    }

    // Global flags may come before the subcommand; only insert when none follows.
    let has_subcommand = argv
        .iter()
        .skip(1)
        .any(|a| matches!(a.as_str(), "optimize" | "fit"));
    if arg1.starts_with('-') && !has_subcommand {
        argv.insert(1, "optimize".to_string());
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_optimize() {
        assert_eq!(rewrite_args(argv(&["sec"])), argv(&["sec", "optimize"]));
        assert_eq!(
            rewrite_args(argv(&["sec", "--te-min", "10"])),
            argv(&["sec", "optimize", "--te-min", "10"])
        );
    }

    #[test]
    fn explicit_subcommands_are_untouched() {
        assert_eq!(rewrite_args(argv(&["sec", "fit"])), argv(&["sec", "fit"]));
        assert_eq!(rewrite_args(argv(&["sec", "-v", "fit"])), argv(&["sec", "-v", "fit"]));
        assert_eq!(rewrite_args(argv(&["sec", "--help"])), argv(&["sec", "--help"]));
    }

    #[test]
    fn axis_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("run.toml");
        std::fs::write(&toml_path, "[echo_time]\nmin = 12.0\nmax = 20.0\n").unwrap();

        let args = OptimizeArgs {
            input: InputArgs {
                config: Some(toml_path),
                ..Default::default()
            },
            te_max: Some(18.0),
            ..Default::default()
        };
        let config = config_from_args(&args.input, Some(args.axis_layer())).unwrap();
        assert_eq!(config.echo_time.bounds().min(), 12.0);
        assert_eq!(config.echo_time.bounds().max(), 18.0);
    }

    #[test]
    fn inline_calibration_overrides_csv() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("cal.csv");
        std::fs::write(&csv_path, "concentration,t1,t2\n0,1000,45\n8,50,14\n").unwrap();

        let csv_only = InputArgs {
            calibration: Some(csv_path.clone()),
            ..Default::default()
        };
        assert_eq!(config_from_args(&csv_only, None).unwrap().calibration.len(), 2);

        let both = InputArgs {
            calibration: Some(csv_path),
            concentrations: Some(vec![0.0, 1.0, 2.0]),
            t1: Some(vec![900.0, 400.0, 250.0]),
            t2: Some(vec![40.0, 30.0, 25.0]),
            ..Default::default()
        };
        assert_eq!(config_from_args(&both, None).unwrap().calibration.len(), 3);
    }
}
