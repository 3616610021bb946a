//! Reference data and synthetic noisy samples.
//!
//! `reference_observations` is the 17-point polarizer measurement the CLI uses
//! when no data is given. `generate_sample` draws Malus-law intensities with
//! Gaussian noise, rounded like a hand-recorded table, so the fitter can be
//! exercised on known parameters.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{MalusParams, Observations};
use crate::error::AppError;
use crate::models::predict;

/// Angles (degrees) of the reference measurement.
pub const REFERENCE_ANGLES: [f64; 17] = [
    0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 110.0, 120.0, 130.0, 140.0,
    150.0, 160.0,
];

/// Intensities of the reference measurement.
pub const REFERENCE_INTENSITIES: [f64; 17] = [
    0.75, 0.42, 0.34, 0.2, 0.24, 0.3, 0.68, 0.68, 0.87, 1.03, 1.3, 1.22, 1.33, 1.29, 0.97, 0.91,
    0.84,
];

pub fn reference_observations() -> Observations {
    Observations::new(REFERENCE_ANGLES.to_vec(), REFERENCE_INTENSITIES.to_vec())
}

/// Settings for [`generate_sample`].
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub params: MalusParams,
    pub start_deg: f64,
    pub step_deg: f64,
    pub count: usize,
    /// Standard deviation of the additive Gaussian noise.
    pub noise_sigma: f64,
    /// Decimal places kept in the generated intensities.
    pub decimals: u32,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            params: MalusParams::new(1.0, 1.0, 0.3),
            start_deg: 0.0,
            step_deg: 10.0,
            count: 18,
            noise_sigma: 0.1,
            decimals: 2,
            seed: 42,
        }
    }
}

/// Draw a noisy, rounded sample of the Malus curve.
///
/// The same config (seed included) always yields the same sample.
pub fn generate_sample(config: &SampleConfig) -> Result<Observations, AppError> {
    if config.count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }
    if !(config.step_deg.is_finite() && config.step_deg > 0.0 && config.start_deg.is_finite()) {
        return Err(AppError::new(2, "Invalid angle grid for sample generation."));
    }
    if !config.params.is_finite() {
        return Err(AppError::new(2, "Sample parameters must be finite."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise_sigma)
        .map_err(|e| AppError::new(2, format!("Noise distribution error: {e}")))?;
    let scale = 10f64.powi(config.decimals as i32);

    let angles: Vec<f64> = (0..config.count)
        .map(|i| config.start_deg + i as f64 * config.step_deg)
        .collect();
    let intensities = angles
        .iter()
        .map(|&t| {
            let noisy = predict(t, &config.params) + normal.sample(&mut rng);
            (noisy * scale).round() / scale
        })
        .collect();

    Ok(Observations::new(angles, intensities))
}
