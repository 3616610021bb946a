//! Calibration angles derived from the fitted phase.
//!
//! Both functions take the phase in **degrees** (convert the fitted radians
//! with [`crate::math::to_degrees`] first) and return raw arithmetic results.
//! No reduction modulo 180° or 360° is applied; callers wanting a canonical
//! range reduce it themselves.

use crate::domain::CalibrationAngles;
use crate::math::to_degrees;

/// Polarizer rotation with maximum transmittance (analyzer parallel).
pub fn parallel_angle(phi_deg: f64) -> f64 {
    180.0 - phi_deg
}

/// Polarizer rotation with minimum transmittance (analyzer crossed).
pub fn crossed_angle(phi_deg: f64) -> f64 {
    90.0 - phi_deg
}

impl CalibrationAngles {
    pub fn from_phi_deg(phi_deg: f64) -> Self {
        Self {
            parallel_deg: parallel_angle(phi_deg),
            crossed_deg: crossed_angle(phi_deg),
        }
    }

    /// Convert a fitted phase (radians) and derive both angles.
    pub fn from_phi_rad(phi: f64) -> Self {
        Self::from_phi_deg(to_degrees(phi))
    }
}
