//! Degree/radian conversion.
//!
//! Angles cross the public API in degrees; the fitted phase lives in radians.

use std::f64::consts::PI;

/// `degrees * π / 180`.
pub fn to_radians(degrees: f64) -> f64 {
    degrees * (PI / 180.0)
}

/// `radians * 180 / π`.
pub fn to_degrees(radians: f64) -> f64 {
    radians * (180.0 / PI)
}
