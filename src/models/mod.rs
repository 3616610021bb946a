//! Malus's-law model implementation.
//!
//! The model is a set of small, pure functions so the solver and the curve
//! sampler can share them.

pub mod model;

pub use model::*;
