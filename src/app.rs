//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs the tracing subscriber
//! - parses CLI arguments
//! - runs the fit pipeline
//! - prints summaries, tables or JSON

use std::time::Duration;

use clap::Parser;
use tracing::warn;

use crate::cli::{Command, CurveArgs, DataArgs, FitArgs, SampleArgs};
use crate::data::{SampleConfig, generate_sample};
use crate::domain::{FitConfig, FitOptions, MalusParams, Observations};
use crate::error::AppError;
use crate::io::{format_csv_floats, parse_csv_floats};

pub mod pipeline;

/// Entry point for the `malus` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    if let Err(err) = crate::telemetry::init_tracing() {
        eprintln!("warning: {err}");
    }

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Raw(args) => handle_raw(args),
        Command::Curve(args) => handle_curve(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args, 1.0)?;
    let run = pipeline::run_fit(&config)?;

    if args.json {
        println!("{}", crate::report::to_json(&run.report)?);
    } else {
        println!("{}", crate::report::format_fit_summary(&run.report));
    }
    Ok(())
}

fn handle_raw(args: DataArgs) -> Result<(), AppError> {
    let observations = observations_from_args(&args)?;
    if observations.angles_deg.len() != observations.intensities.len() {
        return Err(AppError::new(2, "X and Y data must have the same number of elements."));
    }
    print!("{}", crate::report::format_observations(&observations));
    Ok(())
}

fn handle_curve(args: CurveArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args.fit, args.step)?;
    let run = pipeline::run_fit(&config)?;
    let grid = pipeline::fitted_curve(&run, config.grid_step_deg)?;

    if args.fit.json {
        let json = serde_json::to_string_pretty(&grid)
            .map_err(|e| AppError::new(4, format!("Failed to serialize curve: {e}")))?;
        println!("{json}");
    } else {
        print!("{}", crate::report::format_curve(&grid));
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        params: MalusParams::new(args.i0, args.phi, args.offset),
        step_deg: args.step,
        count: args.count,
        noise_sigma: args.noise,
        seed: args.seed,
        ..SampleConfig::default()
    };
    let sample = generate_sample(&config)?;

    let angle_decimals = if args.step.fract() == 0.0 { 0 } else { 2 };
    println!(
        "--angles \"{}\"",
        format_csv_floats(&sample.angles_deg, angle_decimals)
    );
    println!(
        "--intensities \"{}\"",
        format_csv_floats(&sample.intensities, config.decimals as usize)
    );
    Ok(())
}

/// Parse both lists; a length mismatch is reported but left for the fitter to reject.
pub fn observations_from_args(args: &DataArgs) -> Result<Observations, AppError> {
    let angles = parse_csv_floats("angle", &args.angles)?;
    let intensities = parse_csv_floats("intensity", &args.intensities)?;

    if angles.len() != intensities.len() {
        warn!(
            angles = angles.len(),
            intensities = intensities.len(),
            "X and Y data must have the same number of elements"
        );
    }
    Ok(Observations::new(angles, intensities))
}

pub fn fit_config_from_args(args: &FitArgs, grid_step_deg: f64) -> Result<FitConfig, AppError> {
    Ok(FitConfig {
        observations: observations_from_args(&args.data)?,
        initial_guess: MalusParams::new(args.i0_guess, args.phi_guess, args.offset_guess),
        options: FitOptions {
            max_iterations: args.max_iterations,
            time_budget: args.time_budget_ms.map(Duration::from_millis),
            ..FitOptions::default()
        },
        grid_step_deg,
    })
}

/// Rewrite argv so `malus` defaults to `malus fit`.
///
/// Rules:
/// - `malus`                        -> `malus fit`
/// - `malus --json ...`             -> `malus fit --json ...`
/// - `malus --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
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
    fn bare_invocation_fits() {
        assert_eq!(rewrite_args(argv(&["malus"])), argv(&["malus", "fit"]));
        assert_eq!(
            rewrite_args(argv(&["malus", "--json"])),
            argv(&["malus", "fit", "--json"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(
            rewrite_args(argv(&["malus", "--help"])),
            argv(&["malus", "--help"])
        );
        assert_eq!(
            rewrite_args(argv(&["malus", "curve", "--step", "2"])),
            argv(&["malus", "curve", "--step", "2"])
        );
    }

    #[test]
    fn config_carries_budget_and_guess() {
        let cli = crate::cli::Cli::parse_from([
            "malus",
            "fit",
            "--time-budget-ms",
            "250",
            "--i0-guess",
            "2",
            "--angles",
            "0, 45, 90",
            "--intensities",
            "1, 0.5, 0",
        ]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        let config = fit_config_from_args(&args, 1.0).unwrap();
        assert_eq!(config.options.time_budget, Some(Duration::from_millis(250)));
        assert_eq!(config.initial_guess.i0, 2.0);
        assert_eq!(config.observations.len(), 3);
    }
}
