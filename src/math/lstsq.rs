//! Small dense linear-algebra helpers for the 3-parameter solver.
//!
//! Every Levenberg–Marquardt step solves the damped normal equations
//!
//! ```text
//! (JᵀJ + λ·D) δ = Jᵀ r
//! ```
//!
//! and, once converged, the unscaled covariance `(JᵀJ)⁻¹` is needed. Both go
//! through the SVD so rank deficiency is detected instead of producing
//! garbage.

use nalgebra::{Matrix3, Vector3};

/// Singular values below `RANK_RTOL * σ_max` count as zero.
const RANK_RTOL: f64 = 1e-12;

/// Solve a (damped) 3×3 normal-equation system.
///
/// Returns `None` if the system is singular at the working tolerance or the
/// solution is not finite.
pub fn solve_normal_equations(a: &Matrix3<f64>, b: &Vector3<f64>) -> Option<Vector3<f64>> {
    if let Some(chol) = a.cholesky() {
        let x = chol.solve(b);
        if x.iter().all(|v| v.is_finite()) {
            return Some(x);
        }
    }

    // Cholesky fails for semi-definite systems; retry with a tolerant SVD solve.
    let svd = a.svd(true, true);
    let tol = RANK_RTOL * svd.singular_values.max();
    let x = svd.solve(b, tol).ok()?;
    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}

/// Invert `JᵀJ`, or `None` if it is rank deficient.
pub fn invert_information(jtj: &Matrix3<f64>) -> Option<Matrix3<f64>> {
    let svd = jtj.svd(true, true);
    let s_max = svd.singular_values.max();
    if !(s_max.is_finite() && s_max > 0.0) {
        return None;
    }
    if svd.singular_values.iter().any(|&s| s <= RANK_RTOL * s_max) {
        return None;
    }

    let inv = svd.pseudo_inverse(0.0).ok()?;
    if inv.iter().all(|v| v.is_finite()) {
        Some(inv)
    } else {
        None
    }
}
