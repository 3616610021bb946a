//! Malus's-law transmittance model.
//!
//! ```text
//! I(θ) = i0 · cos²(rad(θ) + φ) + offset
//! ```
//!
//! `θ` is in degrees, `φ` in radians. Because `cos²` has period π, `φ` and
//! `φ + kπ` describe the same curve; fitted phases are only meaningful mod π.
//!
//! The fitter relies on two primitive operations:
//! - predict `I(θ)` for the residuals
//! - the gradient of `I(θ)` w.r.t. `(i0, φ, offset)` for the Jacobian

use crate::domain::{CurveGrid, MalusParams};
use crate::math::to_radians;

/// Predicted intensity at a single angle (degrees).
pub fn intensity(theta_deg: f64, i0: f64, phi: f64, offset: f64) -> f64 {
    let c = (to_radians(theta_deg) + phi).cos();
    i0 * c * c + offset
}

/// Predict `I(θ)` for the given parameters.
pub fn predict(theta_deg: f64, params: &MalusParams) -> f64 {
    intensity(theta_deg, params.i0, params.phi, params.offset)
}

/// Vectorized evaluation; output has the same length as `angles_deg`.
pub fn predict_many(angles_deg: &[f64], params: &MalusParams) -> Vec<f64> {
    angles_deg.iter().map(|&t| predict(t, params)).collect()
}

/// Fill `out` with `∂I/∂(i0, φ, offset)` at `theta_deg`.
pub fn fill_gradient(theta_deg: f64, params: &MalusParams, out: &mut [f64; 3]) {
    let u = to_radians(theta_deg) + params.phi;
    let c = u.cos();
    out[0] = c * c;
    // d/dφ cos²(u) = -2 sin(u) cos(u) = -sin(2u)
    out[1] = -params.i0 * (2.0 * u).sin();
    out[2] = 1.0;
}

/// Sample the model every `step_deg` degrees over `[start_deg, end_deg]`.
///
/// The end point is always included. A degenerate range, or a step that is
/// not finite and positive, yields a single sample at `start_deg`. The grid
/// holds `(end_deg - start_deg) / step_deg` points, so callers bound that ratio.
pub fn sample_curve(
    params: &MalusParams,
    start_deg: f64,
    end_deg: f64,
    step_deg: f64,
) -> CurveGrid {
    let mut angles = Vec::new();
    if step_deg.is_finite() && step_deg > 0.0 && end_deg > start_deg {
        let steps = ((end_deg - start_deg) / step_deg).floor() as usize;
        angles.extend((0..=steps).map(|i| start_deg + i as f64 * step_deg));
        // Close the range when the step does not divide it.
        if angles.last().is_some_and(|&a| end_deg - a > 1e-9 * step_deg) {
            angles.push(end_deg);
        }
    } else {
        angles.push(start_deg);
    }

    let intensities = predict_many(&angles, params);
    CurveGrid {
        angles_deg: angles,
        intensities,
    }
}
