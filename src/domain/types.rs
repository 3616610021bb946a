//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - passed between the fitter and its callers without copying arrays around
//! - printed as JSON by the CLI (`malus fit --json`)

use std::time::Duration;

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Number of free parameters in the Malus model.
pub const PARAM_COUNT: usize = 3;

/// Parameters of `I(θ) = i0 · cos²(rad(θ) + phi) + offset`.
///
/// `phi` is in **radians**; angles passed to the model are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MalusParams {
    /// Amplitude (scale) of the transmitted intensity.
    pub i0: f64,
    /// Phase offset between the polarizer's zero and its optical axis, radians.
    pub phi: f64,
    /// Baseline (DC) intensity.
    pub offset: f64,
}

impl MalusParams {
    pub const fn new(i0: f64, phi: f64, offset: f64) -> Self {
        Self { i0, phi, offset }
    }

    /// Fitted phase in degrees, for display.
    pub fn phi_deg(&self) -> f64 {
        crate::math::to_degrees(self.phi)
    }

    pub fn is_finite(&self) -> bool {
        self.i0.is_finite() && self.phi.is_finite() && self.offset.is_finite()
    }

    pub(crate) fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.i0, self.phi, self.offset)
    }

    pub(crate) fn from_vector(v: &Vector3<f64>) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// The default initial guess `(i0, phi, offset) = (1, 0, 0)`.
impl Default for MalusParams {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }
}

/// Paired angle/intensity measurements.
///
/// No invariants are enforced on construction; the fitter validates shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observations {
    pub angles_deg: Vec<f64>,
    pub intensities: Vec<f64>,
}

impl Observations {
    pub fn new(angles_deg: Vec<f64>, intensities: Vec<f64>) -> Self {
        Self {
            angles_deg,
            intensities,
        }
    }

    /// Number of complete pairs.
    pub fn len(&self) -> usize {
        self.angles_deg.len().min(self.intensities.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(min, max)` over the finite angles, if any.
    pub fn angle_range(&self) -> Option<(f64, f64)> {
        let mut finite = self.angles_deg.iter().copied().filter(|a| a.is_finite());
        let first = finite.next()?;
        Some(finite.fold((first, first), |(lo, hi), a| (lo.min(a), hi.max(a))))
    }
}

/// Goodness-of-fit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    /// Residual sum of squares at the solution.
    pub sse: f64,
    /// Residual sum of squares at the initial guess.
    pub initial_sse: f64,
    pub rmse: f64,
    /// Coefficient of determination. `NaN` when the intensities have zero variance.
    pub r_squared: f64,
    pub n: usize,
    /// Accepted Levenberg–Marquardt steps.
    pub iterations: usize,
}

/// Output of a single fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub params: MalusParams,
    /// Row-major covariance of `(i0, phi, offset)`.
    ///
    /// Filled with `+∞` when the parameters are not identifiable from the data.
    pub covariance: [[f64; PARAM_COUNT]; PARAM_COUNT],
    pub quality: FitQuality,
}

impl FitResult {
    pub fn covariance_matrix(&self) -> Matrix3<f64> {
        Matrix3::from_fn(|r, c| self.covariance[r][c])
    }

    /// One-sigma uncertainties (square roots of the covariance diagonal).
    pub fn std_errors(&self) -> [f64; PARAM_COUNT] {
        std::array::from_fn(|i| self.covariance[i][i].sqrt())
    }
}

/// Solver knobs for a single fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    /// Maximum number of outer Levenberg–Marquardt iterations.
    pub max_iterations: usize,
    /// Optional wall-clock budget; exceeding it is a divergence.
    pub time_budget: Option<Duration>,
    /// Relative SSE reduction below which the fit is converged.
    pub ftol: f64,
    /// Relative step size below which the fit is converged.
    pub xtol: f64,
    /// Largest cosine between the residual and a Jacobian column at convergence.
    pub gtol: f64,
    /// Initial Marquardt damping factor.
    pub lambda_init: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            time_budget: None,
            ftol: 1e-12,
            xtol: 1e-12,
            gtol: 1e-12,
            lambda_init: 1e-3,
        }
    }
}

/// Polarizer orientations derived from the fitted phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationAngles {
    /// Rotation (degrees) with maximum transmittance.
    pub parallel_deg: f64,
    /// Rotation (degrees) with minimum transmittance.
    pub crossed_deg: f64,
}

/// Model sampled on a regular angle grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveGrid {
    pub angles_deg: Vec<f64>,
    pub intensities: Vec<f64>,
}

/// A full run's configuration as understood by the CLI pipeline.
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub observations: Observations,
    pub initial_guess: MalusParams,
    pub options: FitOptions,
    /// Grid step (degrees) for `malus curve`.
    pub grid_step_deg: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_range_skips_non_finite() {
        let obs = Observations::new(vec![f64::NAN, 30.0, -10.0, 200.0], vec![0.0; 4]);
        assert_eq!(obs.angle_range(), Some((-10.0, 200.0)));
        assert_eq!(Observations::default().angle_range(), None);
    }

    #[test]
    fn std_errors_are_sqrt_of_diagonal() {
        let fit = FitResult {
            params: MalusParams::default(),
            covariance: [[4.0, 0.1, 0.0], [0.1, 0.25, 0.0], [0.0, 0.0, 9.0]],
            quality: FitQuality {
                sse: 0.0,
                initial_sse: 0.0,
                rmse: 0.0,
                r_squared: 1.0,
                n: 3,
                iterations: 0,
            },
        };
        assert_eq!(fit.std_errors(), [2.0, 0.5, 3.0]);
        assert_eq!(fit.covariance_matrix()[(0, 1)], 0.1);
    }
}
