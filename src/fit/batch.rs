//! Parallel fitting of many independent observation sets.
//!
//! Each fit is a pure function of its inputs, so the sets are fitted with
//! `rayon` and no shared state. Results come back in input order.

use rayon::prelude::*;

use crate::domain::{FitOptions, FitResult, MalusParams, Observations};
use crate::error::FitError;
use crate::fit::fitter::fit_observations;

/// Fit every observation set with the same initial guess and options.
pub fn fit_batch(
    sets: &[Observations],
    initial_guess: MalusParams,
    opts: &FitOptions,
) -> Vec<Result<FitResult, FitError>> {
    sets.par_iter()
        .map(|obs| fit_observations(obs, initial_guess, opts))
        .collect()
}
