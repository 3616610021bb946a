//! Curve fitting.
//!
//! Responsibilities:
//!
//! - fit the Malus model to one observation set (Levenberg–Marquardt)
//! - estimate the parameter covariance
//! - fit many independent sets in parallel

pub mod batch;
pub mod fitter;

pub use batch::*;
pub use fitter::*;
