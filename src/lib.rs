//! `malus-fit` library crate.
//!
//! Fits Malus's law, `I(θ) = I0 · cos²(rad(θ) + φ) + offset`, to polarizer
//! rotation data and derives the parallel/crossed calibration angles.
//!
//! The binary (`malus`) is a thin wrapper around this library so that:
//!
//! - the fitting core is testable without spawning processes
//! - any front-end (CLI, service, notebook bindings) can call [`fit::fit`] directly

pub mod app;
pub mod calibration;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod telemetry;
