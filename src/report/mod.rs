//! Reporting: fit summaries, data tables and JSON output.

pub mod format;

pub use format::*;

use serde::Serialize;

use crate::domain::{CalibrationAngles, FitQuality, FitResult, MalusParams};

/// Everything a front-end displays after a fit, with `phi` converted to degrees.
#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub params: MalusParams,
    pub phi_deg: f64,
    /// One-sigma uncertainties of `(i0, phi, offset)`; `phi` in radians.
    pub std_errors: [f64; 3],
    pub phi_std_error_deg: f64,
    pub calibration: CalibrationAngles,
    pub quality: FitQuality,
    pub covariance: [[f64; 3]; 3],
}

impl FitReport {
    pub fn new(fit: &FitResult) -> Self {
        let std_errors = fit.std_errors();
        Self {
            params: fit.params,
            phi_deg: fit.params.phi_deg(),
            std_errors,
            phi_std_error_deg: crate::math::to_degrees(std_errors[1]),
            calibration: CalibrationAngles::from_phi_rad(fit.params.phi),
            quality: fit.quality,
            covariance: fit.covariance,
        }
    }
}
