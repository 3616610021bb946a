//! Input helpers.
//!
//! - comma-separated number parsing for the command line (`parse`)

pub mod parse;

pub use parse::*;
