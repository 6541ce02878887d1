//! Sensor models for a simulated quadrotor
//!
//! This crate produces the readings a small multirotor's onboard sensors would report, given the
//! true state of the vehicle. It is intended to feed a flight stack or a navigation filter during
//! software-in-the-loop testing, not to model any particular sensor part. Readings are built from
//! simple analytic models of the environment plus optional zero-mean Gaussian noise:
//!
//! - the Earth magnetic field, interpolated from coarse 10 degree declination, inclination and
//!   strength tables and rotated into the body frame
//! - the International Standard Atmosphere for pressure, temperature and density
//! - WGS84 geodesy (via [`nav-types`](https://crates.io/crates/nav-types)) for converting the local
//!   NED position to latitude, longitude and altitude
//!
//! Linear algebra uses [`nalgebra`](https://crates.io/crates/nalgebra), and noise comes from
//! [`rand`](https://crates.io/crates/rand) and [`rand_distr`](https://crates.io/crates/rand_distr).
//!
//! ## Crate overview
//!
//! - [geomag]: Static geomagnetic tables and the bilinear grid interpolator.
//! - [earth]: Frames, geodetic conversion, the Earth magnetic field vector and the standard atmosphere.
//! - [sensors]: GPS, IMU, magnetometer and barometer adapters with a shared noise source.
//! - [config]: Home position and noise parameters, loadable from JSON, YAML or TOML.
//! - [sim]: A sensor suite driven by a sequence of truth states, with CSV export.
//!
//! ## Frames and units
//!
//! The local level frame is North-East-Down (NED) anchored at the configured home position. The
//! body frame is forward-right-down. Attitude is carried as the Earth-to-body direction cosine
//! matrix $C_n^b$, so a local level vector $v^n$ is expressed in the body frame as $v^b = C_n^b v^n$.
//! Angles passed to the geodetic and magnetic functions are in degrees; Euler angles and angular
//! rates are in radians. The magnetic field is reported in Gauss, pressure in hPa and temperature in
//! degrees Celsius.
pub mod config;
pub mod earth;
pub mod geomag;
pub mod sensors;
pub mod sim;

use std::f64::consts::TAU;

/// Standard gravity in m/s^2
pub const GRAVITY: f64 = 9.80665;

/// Clamp a value into `[min, max]`.
///
/// Unlike [`f64::clamp`] this never panics: if `min > max` the result is `min`. A NaN input is
/// returned unchanged.
///
/// # Example
/// ```rust
/// use quadsim::constrain;
/// assert_eq!(constrain(12.0, 0.0, 10.0), 10.0);
/// assert_eq!(constrain(-1.0, 0.0, 10.0), 0.0);
/// assert_eq!(constrain(5.0, 3.0, 1.0), 3.0);
/// ```
pub fn constrain(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max.max(min)
    } else {
        value
    }
}
/// Wrap an angle to the range -180 to 180 degrees
///
/// Angles already inside the range, including both end points, are returned unchanged. The wrap
/// is closed form, so arbitrarily large finite angles return immediately. Non-finite inputs are
/// returned unchanged and should be rejected by the caller.
///
/// # Arguments
/// * `angle` - The angle to be wrapped in degrees.
/// # Returns
/// * The wrapped angle, which will be in the range -180 to 180 degrees.
/// # Example
/// ```rust
/// use quadsim::wrap_to_180;
/// assert_eq!(wrap_to_180(190.0), -170.0);
/// assert_eq!(wrap_to_180(540.0), 180.0);
/// ```
pub fn wrap_to_180(angle: f64) -> f64 {
    if !angle.is_finite() || (-180.0..=180.0).contains(&angle) {
        return angle;
    }
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    // Positive angles landing on the seam keep the positive sign
    if wrapped <= -180.0 && angle > 0.0 {
        180.0
    } else {
        wrapped
    }
}
/// Wrap an angle to the range 0 to 2π radians, excluding 2π
///
/// # Arguments
/// * `angle` - The angle to be wrapped in radians. Non-finite inputs are returned unchanged.
/// # Example
/// ```rust
/// use quadsim::wrap_to_2pi;
/// use std::f64::consts::PI;
/// assert_eq!(wrap_to_2pi(-PI), PI);
/// assert_eq!(wrap_to_2pi(2.0 * PI), 0.0);
/// ```
pub fn wrap_to_2pi(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to the modulus for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    #[test]
    fn test_constrain() {
        assert_eq!(super::constrain(0.5, 0.0, 1.0), 0.5);
        assert_eq!(super::constrain(1.5, 0.0, 1.0), 1.0);
        assert_eq!(super::constrain(-0.5, 0.0, 1.0), 0.0);
        assert_eq!(super::constrain(0.0, 1.0, -1.0), 1.0);
        assert_eq!(super::constrain(2.0, 1.0, -1.0), 1.0);
        assert!(super::constrain(f64::NAN, 0.0, 1.0).is_nan());
    }
    #[test]
    fn test_wrap_to_180() {
        assert_eq!(super::wrap_to_180(190.0), -170.0);
        assert_eq!(super::wrap_to_180(-190.0), 170.0);
        assert_eq!(super::wrap_to_180(0.0), 0.0);
        assert_eq!(super::wrap_to_180(180.0), 180.0);
        assert_eq!(super::wrap_to_180(-180.0), -180.0);
        assert_eq!(super::wrap_to_180(720.0), 0.0);
    }
    #[test]
    fn test_wrap_to_2pi() {
        assert_eq!(super::wrap_to_2pi(7.0 * PI), PI);
        assert_eq!(super::wrap_to_2pi(-5.0 * PI), PI);
        assert_eq!(super::wrap_to_2pi(0.0), 0.0);
        assert_eq!(super::wrap_to_2pi(PI), PI);
        assert_eq!(super::wrap_to_2pi(2.0 * PI), 0.0);
    }
    #[test]
    fn wrapping_non_finite_returns_immediately() {
        assert!(super::wrap_to_180(f64::NAN).is_nan());
        assert_eq!(super::wrap_to_180(f64::INFINITY), f64::INFINITY);
        assert_eq!(super::wrap_to_2pi(f64::NEG_INFINITY), f64::NEG_INFINITY);
    }
    #[test]
    fn wrapping_huge_angles_terminates() {
        for angle in [1e20, -1e20, f64::MAX, f64::MIN, 3.6e17 + 190.0] {
            let wrapped = super::wrap_to_180(angle);
            assert!((-180.0..=180.0).contains(&wrapped), "{angle} -> {wrapped}");
            let wrapped = super::wrap_to_2pi(angle);
            assert!((0.0..2.0 * PI).contains(&wrapped), "{angle} -> {wrapped}");
        }
        assert_eq!(super::wrap_to_180(540.0), 180.0);
        assert_eq!(super::wrap_to_180(-540.0), -180.0);
        assert_eq!(super::wrap_to_2pi(-1e-300), 0.0);
    }
}
