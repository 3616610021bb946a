//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - model parameters and observations (`MalusParams`, `Observations`)
//! - fit outputs (`FitResult`, `FitQuality`, `CalibrationAngles`, `CurveGrid`)
//! - solver and run configuration (`FitOptions`, `FitConfig`)

pub mod types;

pub use types::*;
