//! End-to-end scenarios through the public API.

use std::f64::consts::PI;

use malus_fit::calibration::{crossed_angle, parallel_angle};
use malus_fit::data::{SampleConfig, generate_sample, reference_observations};
use malus_fit::domain::{CalibrationAngles, FitOptions, MalusParams, Observations};
use malus_fit::error::FitError;
use malus_fit::fit::{fit, fit_batch, fit_observations, residual_sum_of_squares};
use malus_fit::math::{to_degrees, to_radians};
use malus_fit::models::{intensity, predict_many};

fn phase_gap(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(PI);
    d.min(PI - d)
}

#[test]
fn reference_measurement_converges_and_improves_on_guess() {
    let obs = reference_observations();
    assert_eq!(obs.len(), 17);

    let guess = MalusParams::default();
    let fit = fit_observations(&obs, guess, &FitOptions::default())
        .expect("reference data should fit");

    assert!(fit.params.i0 > 0.0, "{:?}", fit.params);
    let initial = residual_sum_of_squares(&obs.angles_deg, &obs.intensities, &guess).unwrap();
    assert!(fit.quality.sse < initial);
    assert_eq!(fit.quality.initial_sse, initial);
    assert!(fit.std_errors().iter().all(|s| s.is_finite()));

    // The curve tops out near 125-135 degrees in the measurement.
    let angles = CalibrationAngles::from_phi_rad(fit.params.phi);
    let parallel = angles.parallel_deg.rem_euclid(180.0);
    assert!((100.0..160.0).contains(&parallel), "parallel={parallel}");
}

#[test]
fn noiseless_round_trip_across_phases() {
    let angles: Vec<f64> = (0..19).map(|i| i as f64 * 10.0).collect();
    for k in 0..12 {
        let truth = MalusParams::new(0.5 + 0.25 * k as f64, -1.5 + 0.3 * k as f64, 0.1 * k as f64);
        let y = predict_many(&angles, &truth);
        let fit = fit(&angles, &y, MalusParams::default(), &FitOptions::default())
            .unwrap_or_else(|e| panic!("{truth:?}: {e}"));

        let p = fit.params;
        assert!(
            (p.i0 - truth.i0).abs() <= 1e-6 * truth.i0,
            "{truth:?} -> {p:?}"
        );
        assert!(phase_gap(p.phi, truth.phi) <= 1e-6, "{truth:?} -> {p:?}");
        assert!((p.offset - truth.offset).abs() <= 1e-6 * truth.offset.abs().max(1.0));
    }
}

#[test]
fn constant_intensities_never_yield_a_spurious_amplitude() {
    let angles: Vec<f64> = (0..17).map(|i| i as f64 * 10.0).collect();
    let y = vec![0.5; angles.len()];

    match fit(&angles, &y, MalusParams::default(), &FitOptions::default()) {
        Ok(fit) => {
            assert!(fit.params.i0.abs() < 1e-6, "{:?}", fit.params);
            assert!((fit.params.offset - 0.5).abs() < 1e-6);
            // A flat curve says nothing about the phase.
            let se = fit.std_errors();
            assert!(se.iter().all(|s| s.is_infinite()), "{se:?}");
        }
        Err(err) => assert!(matches!(err, FitError::FitDivergence { .. })),
    }
}

#[test]
fn repeated_angles_never_report_a_tight_uncertainty() {
    // Two distinct angles cannot pin down three parameters.
    let angles: Vec<f64> = [30.0, 75.0].repeat(20);
    let y = vec![0.5; angles.len()];

    match fit(&angles, &y, MalusParams::default(), &FitOptions::default()) {
        Ok(fit) => {
            let se = fit.std_errors();
            assert!(se.iter().all(|s| s.is_infinite()), "{se:?}");
            assert!(fit.covariance.iter().flatten().all(|v| v.is_infinite()));
        }
        Err(err) => assert!(matches!(err, FitError::FitDivergence { .. })),
    }
}

#[test]
fn mismatched_lengths_are_refused() {
    let err = fit(
        &[0.0, 10.0, 20.0, 30.0],
        &[1.0, 0.9, 0.7],
        MalusParams::default(),
        &FitOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        FitError::InputShapeMismatch {
            angles: 4,
            intensities: 3,
            ..
        }
    ));
}

#[test]
fn model_is_periodic_in_phase() {
    for i in 0..50 {
        let phi = -5.0 + 0.2 * i as f64;
        for theta in [-270.0, -33.0, 0.0, 12.5, 90.0, 181.0, 720.0] {
            let a = intensity(theta, 1.7, phi, 0.4);
            let b = intensity(theta, 1.7, phi + PI, 0.4);
            assert!((a - b).abs() < 1e-12);
        }
    }
}

#[test]
fn conversions_round_trip() {
    for x in [-100.0, -PI, -0.001, 0.0, 0.25, 2.0 * PI, 1e5] {
        assert!((to_radians(to_degrees(x)) - x).abs() <= 1e-13 * x.abs().max(1.0));
    }
}

#[test]
fn derived_angles_sum_identity() {
    for phi in [-720.0, -45.5, 0.0, 0.25, 33.0, 57.5, 179.75] {
        assert_eq!(parallel_angle(phi) + crossed_angle(phi), 270.0 - 2.0 * phi);
    }
}

#[test]
fn synthetic_samples_fit_in_parallel() {
    let sets: Vec<Observations> = (0..8)
        .map(|seed| {
            generate_sample(&SampleConfig {
                seed,
                noise_sigma: 0.02,
                ..SampleConfig::default()
            })
            .unwrap()
        })
        .collect();

    let results = fit_batch(&sets, MalusParams::default(), &FitOptions::default());
    assert_eq!(results.len(), sets.len());
    for res in results {
        let fit = res.unwrap();
        // Generated with (1, 1, 0.3) plus small noise.
        assert!((fit.params.i0 - 1.0).abs() < 0.1, "{:?}", fit.params);
        assert!(phase_gap(fit.params.phi, 1.0) < 0.1, "{:?}", fit.params);
        assert!((fit.params.offset - 0.3).abs() < 0.1, "{:?}", fit.params);
    }
}
