//! Command-line parsing for the Malus's-law fitter.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! modeling/math code. Defaults reproduce the reference measurement so a bare
//! `malus` run fits something meaningful.

use clap::{Args, Parser, Subcommand};

/// Reference angles, as accepted by `--angles`.
pub const DEFAULT_ANGLES: &str =
    "0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120, 130, 140, 150, 160";

/// Reference intensities, as accepted by `--intensities`.
pub const DEFAULT_INTENSITIES: &str = concat!(
    "0.75, 0.42, 0.34, 0.2, 0.24, 0.3, 0.68, 0.68, 0.87, ",
    "1.03, 1.3, 1.22, 1.33, 1.29, 0.97, 0.91, 0.84",
);

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "malus",
    version,
    about = "Fit Malus's law to polarizer rotation data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the model and print I0, phi, offset and the calibration angles.
    Fit(FitArgs),
    /// Print the parsed observations without fitting.
    Raw(DataArgs),
    /// Fit, then print the model sampled on a dense angle grid (for plotting).
    Curve(CurveArgs),
    /// Generate a synthetic noisy sample in `--angles/--intensities` form.
    Sample(SampleArgs),
}

/// Observation input as comma-separated text.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Angles in degrees (comma-separated). The list may start with a negative value.
    #[arg(short = 'x', long, default_value = DEFAULT_ANGLES, allow_hyphen_values = true)]
    pub angles: String,

    /// Measured intensities (comma-separated).
    #[arg(short = 'y', long, default_value = DEFAULT_INTENSITIES, allow_hyphen_values = true)]
    pub intensities: String,
}

/// Options for fitting.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Initial guess for the amplitude I0.
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub i0_guess: f64,

    /// Initial guess for the phase phi (radians).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub phi_guess: f64,

    /// Initial guess for the baseline offset.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub offset_guess: f64,

    /// Iteration budget of the optimizer.
    #[arg(long, default_value_t = 200)]
    pub max_iterations: usize,

    /// Optional wall-clock budget of the optimizer, in milliseconds.
    #[arg(long)]
    pub time_budget_ms: Option<u64>,

    /// Print JSON instead of the text summary.
    #[arg(long)]
    pub json: bool,
}

/// Options for `malus curve`.
#[derive(Debug, Args, Clone)]
pub struct CurveArgs {
    #[command(flatten)]
    pub fit: FitArgs,

    /// Grid step in degrees.
    #[arg(long, default_value_t = 1.0)]
    pub step: f64,
}

/// Options for `malus sample`.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// True amplitude.
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub i0: f64,

    /// True phase (radians).
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub phi: f64,

    /// True baseline offset.
    #[arg(long, default_value_t = 0.3, allow_negative_numbers = true)]
    pub offset: f64,

    /// Standard deviation of the Gaussian noise.
    #[arg(long, default_value_t = 0.1)]
    pub noise: f64,

    /// Number of angles.
    #[arg(short = 'n', long, default_value_t = 18)]
    pub count: usize,

    /// Angle step in degrees, starting at 0.
    #[arg(long, default_value_t = 10.0)]
    pub step: f64,
}
