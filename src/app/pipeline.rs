//! Shared "fit pipeline" used by the `fit` and `curve` commands.
//!
//! observations -> fit -> report (+ optional dense curve grid)
//!
//! The commands can then focus on presentation (text vs JSON).

use crate::domain::{CurveGrid, FitConfig, FitResult, Observations};
use crate::error::AppError;
use crate::fit::fit_observations;
use crate::models::sample_curve;
use crate::report::FitReport;

/// Largest curve grid `malus curve` will build.
pub const MAX_CURVE_POINTS: usize = 1_000_000;

/// All computed outputs of a single fit run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub observations: Observations,
    pub fit: FitResult,
    pub report: FitReport,
}

/// Execute the fit and derive the report.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let fit = fit_observations(&config.observations, config.initial_guess, &config.options)?;
    let report = FitReport::new(&fit);

    Ok(RunOutput {
        observations: config.observations.clone(),
        fit,
        report,
    })
}

/// Sample the fitted model every `step_deg` over the observed angle range.
pub fn fitted_curve(run: &RunOutput, step_deg: f64) -> Result<CurveGrid, AppError> {
    if !(step_deg.is_finite() && step_deg > 0.0) {
        return Err(AppError::new(2, "Curve step must be a positive number of degrees."));
    }
    let (start, end) = run
        .observations
        .angle_range()
        .ok_or_else(|| AppError::new(2, "No finite angles to span."))?;
    if (end - start) / step_deg + 2.0 > MAX_CURVE_POINTS as f64 {
        return Err(AppError::new(
            2,
            format!("Curve step {step_deg} is too fine: more than {MAX_CURVE_POINTS} points."),
        ));
    }

    let grid = sample_curve(&run.fit.params, start, end, step_deg);
    if grid.intensities.iter().any(|v| !v.is_finite()) {
        return Err(AppError::new(4, "Non-finite model prediction on curve grid."));
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reference_observations;
    use crate::domain::{FitOptions, MalusParams};

    fn reference_config() -> FitConfig {
        FitConfig {
            observations: reference_observations(),
            initial_guess: MalusParams::default(),
            options: FitOptions::default(),
            grid_step_deg: 1.0,
        }
    }

    #[test]
    fn reference_run_produces_curve_over_observed_range() {
        let run = run_fit(&reference_config()).unwrap();
        let grid = fitted_curve(&run, 1.0).unwrap();
        assert_eq!(grid.angles_deg.len(), 161);
        assert_eq!(grid.angles_deg[0], 0.0);
        assert_eq!(*grid.angles_deg.last().unwrap(), 160.0);
    }

    #[test]
    fn invalid_step_is_rejected() {
        let run = run_fit(&reference_config()).unwrap();
        assert_eq!(fitted_curve(&run, 0.0).unwrap_err().exit_code(), 2);
        assert_eq!(fitted_curve(&run, f64::NAN).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn overly_fine_step_is_rejected() {
        let run = run_fit(&reference_config()).unwrap();
        let err = fitted_curve(&run, 1e-12).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("too fine"), "{err}");

        let grid = fitted_curve(&run, 0.01).unwrap();
        assert_eq!(grid.angles_deg.len(), 16_001);
    }

    #[test]
    fn shape_mismatch_maps_to_input_error() {
        let mut config = reference_config();
        config.observations.intensities.pop();
        let err = run_fit(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
