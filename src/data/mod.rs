//! Built-in data: the reference measurement and a synthetic sample generator.

pub mod synthetic;

pub use synthetic::*;
