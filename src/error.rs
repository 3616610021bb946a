//! Error types.
//!
//! Two layers:
//!
//! - [`FitError`] is the typed failure of the fitting core. It is returned
//!   synchronously from [`crate::fit::fit`] and never logged inside the core.
//! - [`AppError`] is what the `malus` binary reports: a message plus the
//!   process exit code.
//!
//! Exit codes:
//! - `2` bad input (parse errors, shape mismatch, invalid flags)
//! - `3` the optimizer did not converge
//! - `4` internal errors (serialization, non-finite model output)

use thiserror::Error;

/// Failure of a single fit invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// The two sequences differ in length, or there are fewer observations
    /// than free parameters. No optimizer iteration is performed.
    #[error(
        "shape mismatch: {angles} angles, {intensities} intensities (min {min_len})"
    )]
    InputShapeMismatch {
        angles: usize,
        intensities: usize,
        min_len: usize,
    },

    /// The optimizer could not reach a finite, converged solution within its budget.
    #[error("fit diverged: {reason}")]
    FitDivergence { reason: String },
}

impl FitError {
    pub(crate) fn divergence(reason: impl Into<String>) -> Self {
        FitError::FitDivergence {
            reason: reason.into(),
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let exit_code = match err {
            FitError::InputShapeMismatch { .. } => 2,
            FitError::FitDivergence { .. } => 3,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_errors_map_to_exit_codes() {
        let shape = FitError::InputShapeMismatch {
            angles: 3,
            intensities: 4,
            min_len: 3,
        };
        let app = AppError::from(shape);
        assert_eq!(app.exit_code(), 2);
        assert!(app.to_string().contains("3 angles, 4 intensities"), "{app}");

        let diverged = FitError::divergence("iteration budget exhausted");
        let app = AppError::from(diverged);
        assert_eq!(app.exit_code(), 3);
        assert!(app.to_string().contains("iteration budget exhausted"));
    }
}
