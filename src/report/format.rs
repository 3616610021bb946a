//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays free of presentation concerns
//! - output changes are localized (important for snapshot-style tests)

use crate::domain::{CurveGrid, Observations};
use crate::error::AppError;
use crate::report::FitReport;

/// Fit summary: parameters and derived angles to two decimals, then diagnostics.
pub fn format_fit_summary(report: &FitReport) -> String {
    let mut out = String::new();
    let p = &report.params;

    out.push_str("=== malus - Malus's law fit ===\n");
    out.push_str(&format!(
        "I0_fit:         {:.2} ± {}\n",
        p.i0,
        fmt_sigma(report.std_errors[0])
    ));
    out.push_str(&format!(
        "phi_fit:        {:.2} degrees ± {}\n",
        report.phi_deg,
        fmt_sigma(report.phi_std_error_deg)
    ));
    out.push_str(&format!(
        "offset_fit:     {:.2} ± {}\n",
        p.offset,
        fmt_sigma(report.std_errors[2])
    ));
    out.push_str(&format!("parallel_angle: {:.2}\n", report.calibration.parallel_deg));
    out.push_str(&format!("crossed_angle:  {:.2}\n", report.calibration.crossed_deg));

    let q = &report.quality;
    out.push_str(&format!(
        "\nFit quality: n={} | SSE={:.6} (initial {:.6}) | RMSE={:.4} | R²={} | iterations={}\n",
        q.n,
        q.sse,
        q.initial_sse,
        q.rmse,
        if q.r_squared.is_finite() {
            format!("{:.4}", q.r_squared)
        } else {
            "n/a".to_string()
        },
        q.iterations
    ));
    out.push_str("Note: phi is determined modulo 180 degrees.\n");

    out
}

/// Two-column table of the raw observations.
pub fn format_observations(obs: &Observations) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>12} {:>12}\n", "angle_deg", "intensity"));
    out.push_str(&format!("{:->12} {:->12}\n", "", ""));
    for (t, y) in obs.angles_deg.iter().zip(&obs.intensities) {
        out.push_str(&format!("{t:>12.2} {y:>12.4}\n"));
    }
    out
}

/// `angle,intensity` lines for an external plotter.
pub fn format_curve(grid: &CurveGrid) -> String {
    let mut out = String::from("angle_deg,intensity\n");
    for (t, y) in grid.angles_deg.iter().zip(&grid.intensities) {
        out.push_str(&format!("{t:.4},{y:.6}\n"));
    }
    out
}

pub fn to_json(report: &FitReport) -> Result<String, AppError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| AppError::new(4, format!("Failed to serialize fit report: {e}")))
}

fn fmt_sigma(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.2}")
    } else {
        "unbounded".to_string()
    }
}
