//! Mathematical utilities: angle conversion and small least-squares solves.

pub mod angles;
pub mod lstsq;

pub use angles::*;
pub use lstsq::*;
