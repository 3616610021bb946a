//! Levenberg–Marquardt fit of the Malus model.
//!
//! Given:
//! - angles `θ_i` (degrees)
//! - observed intensities `y_i`
//! - an initial guess `(i0, φ, offset)`
//!
//! we minimize `Σ (y_i - I(θ_i; i0, φ, offset))²` with Marquardt-scaled damping
//! and an analytic Jacobian, then estimate the parameter covariance as
//! `s² (JᵀJ)⁻¹` with `s² = SSE / (n - 3)`.
//!
//! Phase ambiguity: `φ` is only determined modulo π. The solver reports
//! whichever representative it converges to. The only normalization applied
//! is the amplitude sign: `(i0, φ, c)` and `(-i0, φ + π/2, c + i0)` are the same
//! curve, and a negative `i0` is reported in the non-negative form.

use std::f64::consts::FRAC_PI_2;
use std::time::Instant;

use nalgebra::{Matrix3, Vector3};
use tracing::{debug, trace};

use crate::domain::{FitOptions, FitQuality, FitResult, MalusParams, Observations, PARAM_COUNT};
use crate::error::FitError;
use crate::math::{invert_information, solve_normal_equations};
use crate::models::{fill_gradient, predict};

/// Fewest observations that identify three free parameters.
pub const MIN_OBSERVATIONS: usize = PARAM_COUNT;

/// Damping multiplier after a rejected step.
const LAMBDA_UP: f64 = 10.0;
/// Damping divisor after an accepted step.
const LAMBDA_DOWN: f64 = 10.0;
const LAMBDA_MIN: f64 = 1e-15;
/// Beyond this the step is a vanishing gradient step; no progress is possible.
const LAMBDA_MAX: f64 = 1e16;

/// Scaling entries below `DIAG_FLOOR * max(diag)` are lifted so damping never vanishes.
const DIAG_FLOOR: f64 = 1e-12;

/// Residuals, gradient and Gauss–Newton information at one parameter vector.
struct Linearization {
    jtj: Matrix3<f64>,
    /// `Jᵀ r` with `r = y - model`.
    jtr: Vector3<f64>,
    sse: f64,
}

/// Fit the Malus model to paired observations.
///
/// Fails with [`FitError::InputShapeMismatch`] before any iteration if the
/// sequences differ in length or hold fewer than [`MIN_OBSERVATIONS`] pairs,
/// and with [`FitError::FitDivergence`] if the inputs are not finite, the
/// iteration or time budget runs out, or the solution is not finite.
pub fn fit(
    angles_deg: &[f64],
    intensities: &[f64],
    initial_guess: MalusParams,
    opts: &FitOptions,
) -> Result<FitResult, FitError> {
    validate_shape(angles_deg, intensities)?;
    if !(all_finite(angles_deg) && all_finite(intensities)) {
        return Err(FitError::divergence("observations contain non-finite values"));
    }
    if !initial_guess.is_finite() {
        return Err(FitError::divergence("initial guess is not finite"));
    }

    let started = Instant::now();
    let n = angles_deg.len();
    let sse_floor = sse_floor(intensities);

    let mut p = initial_guess.to_vector();
    let mut lin = linearize(angles_deg, intensities, &p);
    if !lin.sse.is_finite() {
        return Err(FitError::divergence("initial residual is not finite"));
    }
    let initial_sse = lin.sse;

    let mut lambda = opts.lambda_init.max(LAMBDA_MIN);
    let mut iterations = 0usize;
    let mut converged = lin.sse <= sse_floor || gradient_is_flat(&lin, opts.gtol);

    while !converged {
        if iterations >= opts.max_iterations {
            return Err(FitError::divergence(format!(
                "no convergence within {} iterations (sse={:.6e})",
                opts.max_iterations, lin.sse
            )));
        }
        if let Some(budget) = opts.time_budget {
            if started.elapsed() > budget {
                return Err(FitError::divergence(format!(
                    "time budget of {budget:?} exhausted after {iterations} iterations"
                )));
            }
        }

        let scale = damping_scale(&lin.jtj);
        let mut accepted = None;
        loop {
            let mut a = lin.jtj;
            for i in 0..PARAM_COUNT {
                a[(i, i)] += lambda * scale[i];
            }

            if let Some(delta) = solve_normal_equations(&a, &lin.jtr) {
                if step_is_negligible(&delta, &p, opts.xtol) {
                    // Nothing left to gain at machine precision.
                    break;
                }
                let trial = p + delta;
                let trial_sse = sse_at(angles_deg, intensities, &trial);
                if trial_sse.is_finite() && trial_sse < lin.sse {
                    accepted = Some((delta, trial));
                    break;
                }
            }

            lambda *= LAMBDA_UP;
            if lambda > LAMBDA_MAX {
                return Err(FitError::divergence(format!(
                    "damping saturated without reducing the residual (sse={:.6e})",
                    lin.sse
                )));
            }
        }

        let Some((delta, trial)) = accepted else {
            break;
        };

        iterations += 1;
        let prev_sse = lin.sse;
        p = trial;
        lin = linearize(angles_deg, intensities, &p);
        lambda = (lambda / LAMBDA_DOWN).max(LAMBDA_MIN);
        trace!(iterations, sse = lin.sse, lambda, "accepted step");

        converged = lin.sse <= sse_floor
            || prev_sse - lin.sse <= opts.ftol * prev_sse
            || step_is_negligible(&delta, &p, opts.xtol)
            || gradient_is_flat(&lin, opts.gtol);
    }

    let mut params = MalusParams::from_vector(&p);
    if !(params.is_finite() && lin.sse.is_finite()) {
        return Err(FitError::divergence("solution is not finite"));
    }

    let mut covariance = estimate_covariance(&lin, n);
    if params.i0 < 0.0 {
        let (flipped, cov) = flip_amplitude_sign(params, &covariance);
        params = flipped;
        covariance = cov;
    }

    debug!(
        iterations,
        sse = lin.sse,
        initial_sse,
        i0 = params.i0,
        phi = params.phi,
        offset = params.offset,
        "malus fit converged"
    );

    let covariance: [[f64; PARAM_COUNT]; PARAM_COUNT] =
        std::array::from_fn(|r| std::array::from_fn(|c| covariance[(r, c)]));
    Ok(FitResult {
        params,
        covariance,
        quality: fit_quality(intensities, lin.sse, initial_sse, iterations),
    })
}

/// [`fit`] over an [`Observations`] value.
pub fn fit_observations(
    observations: &Observations,
    initial_guess: MalusParams,
    opts: &FitOptions,
) -> Result<FitResult, FitError> {
    fit(
        &observations.angles_deg,
        &observations.intensities,
        initial_guess,
        opts,
    )
}

/// Residual sum of squares of `params` against the observations.
///
/// Sequences are checked exactly as [`fit`] checks them, so a length mismatch
/// is an error rather than a sum over the shorter prefix.
pub fn residual_sum_of_squares(
    angles_deg: &[f64],
    intensities: &[f64],
    params: &MalusParams,
) -> Result<f64, FitError> {
    validate_shape(angles_deg, intensities)?;
    Ok(paired_sse(angles_deg, intensities, params))
}

fn paired_sse(angles_deg: &[f64], intensities: &[f64], params: &MalusParams) -> f64 {
    angles_deg
        .iter()
        .zip(intensities)
        .map(|(&t, &y)| {
            let r = y - predict(t, params);
            r * r
        })
        .sum()
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

fn validate_shape(angles_deg: &[f64], intensities: &[f64]) -> Result<(), FitError> {
    if angles_deg.len() != intensities.len() || angles_deg.len() < MIN_OBSERVATIONS {
        return Err(FitError::InputShapeMismatch {
            angles: angles_deg.len(),
            intensities: intensities.len(),
            min_len: MIN_OBSERVATIONS,
        });
    }
    Ok(())
}

fn linearize(angles_deg: &[f64], intensities: &[f64], p: &Vector3<f64>) -> Linearization {
    let params = MalusParams::from_vector(p);
    let mut jtj = Matrix3::<f64>::zeros();
    let mut jtr = Vector3::<f64>::zeros();
    let mut sse = 0.0;
    let mut row = [0.0; PARAM_COUNT];

    for (&t, &y) in angles_deg.iter().zip(intensities) {
        fill_gradient(t, &params, &mut row);
        let j = Vector3::from(row);
        let r = y - predict(t, &params);
        jtj += j * j.transpose();
        jtr += j * r;
        sse += r * r;
    }

    Linearization { jtj, jtr, sse }
}

fn sse_at(angles_deg: &[f64], intensities: &[f64], p: &Vector3<f64>) -> f64 {
    paired_sse(angles_deg, intensities, &MalusParams::from_vector(p))
}

/// SSE indistinguishable from an exact fit at double precision.
fn sse_floor(intensities: &[f64]) -> f64 {
    let peak = intensities.iter().fold(0.0_f64, |m, y| m.max(y.abs()));
    let per_point = f64::EPSILON * peak.max(1.0);
    per_point * per_point * intensities.len() as f64
}

fn damping_scale(jtj: &Matrix3<f64>) -> [f64; PARAM_COUNT] {
    let diag_max = jtj.diagonal().max();
    let floor = (DIAG_FLOOR * diag_max).max(f64::MIN_POSITIVE);
    std::array::from_fn(|i| jtj[(i, i)].max(floor))
}

fn step_is_negligible(delta: &Vector3<f64>, p: &Vector3<f64>, xtol: f64) -> bool {
    delta.norm() <= xtol * (p.norm() + xtol)
}

/// Scale-free gradient test: largest cosine between the residual and a Jacobian column.
fn gradient_is_flat(lin: &Linearization, gtol: f64) -> bool {
    if lin.sse <= 0.0 {
        return true;
    }
    let r_norm = lin.sse.sqrt();
    (0..PARAM_COUNT).all(|i| {
        let col_norm = lin.jtj[(i, i)].sqrt();
        col_norm == 0.0 || lin.jtr[i].abs() / (col_norm * r_norm) <= gtol
    })
}

/// `s² (JᵀJ)⁻¹`, or all `+∞` when the parameters are not identifiable.
fn estimate_covariance(lin: &Linearization, n: usize) -> Matrix3<f64> {
    let unidentified = Matrix3::from_element(f64::INFINITY);
    let dof = n.saturating_sub(PARAM_COUNT);
    if dof == 0 {
        return unidentified;
    }
    let Some(inv) = invert_information(&lin.jtj) else {
        return unidentified;
    };
    let s2 = lin.sse / dof as f64;
    let cov = inv * s2;
    if cov.iter().all(|v| v.is_finite()) {
        cov
    } else {
        unidentified
    }
}

/// Map `(i0, φ, c)` to the equivalent `(-i0, φ + π/2, c + i0)` and carry the covariance along.
fn flip_amplitude_sign(params: MalusParams, cov: &Matrix3<f64>) -> (MalusParams, Matrix3<f64>) {
    let flipped = MalusParams::new(
        -params.i0,
        params.phi + FRAC_PI_2,
        params.offset + params.i0,
    );
    if cov.iter().any(|v| !v.is_finite()) {
        return (flipped, *cov);
    }
    #[rustfmt::skip]
    let t = Matrix3::new(
        -1.0, 0.0, 0.0,
         0.0, 1.0, 0.0,
         1.0, 0.0, 1.0,
    );
    (flipped, t * cov * t.transpose())
}

fn fit_quality(intensities: &[f64], sse: f64, initial_sse: f64, iterations: usize) -> FitQuality {
    let n = intensities.len();
    let mean = intensities.iter().sum::<f64>() / n as f64;
    let total: f64 = intensities.iter().map(|y| (y - mean) * (y - mean)).sum();
    let r_squared = if total > 0.0 {
        1.0 - sse / total
    } else {
        f64::NAN
    };

    FitQuality {
        sse,
        initial_sse,
        rmse: (sse / n as f64).sqrt(),
        r_squared,
        n,
        iterations,
    }
}
