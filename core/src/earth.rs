//! Earth-related constants and functions
//!
//! This module contains the physical models of the environment the simulated vehicle flies
//! through: the Earth's magnetic field (built on the survey tables in [`crate::geomag`]), the
//! International Standard Atmosphere for the troposphere, and the frame conversions the sensor
//! models need. The Earth is modeled as the WGS84 ellipsoid.
//!
//! # Coordinate Systems
//! Three frames are used throughout the crate. The local-level frame is North-East-Down (NED)
//! with its origin at the simulation home position. The body frame is fixed to the vehicle:
//! x forward, y right, z down. Attitude is handed to the sensor models as a direction cosine
//! matrix (DCM) $C_n^b$ that maps local-level vectors into the body frame:
//!
//! $$
//! v^b = C_n^b v^n
//! $$
//!
//! For geodetic conversions the [`nav-types`](https://crates.io/crates/nav-types) crate provides
//! the `WGS84` and `ECEF` types. Local NED offsets are rotated into ECEF at the home position,
//! added, and converted back to geodetic coordinates.
//!
//! # Magnetic field
//! The field at a location is described by its declination $D$, inclination $I$ and total
//! strength $F$. The local-level field vector is
//!
//! $$
//! H = F \cos I, \qquad b^n = \begin{bmatrix} H \cos D \\\\ H \sin D \\\\ H \tan I \end{bmatrix}
//! $$
//!
//! which is then rotated into the body frame with the vehicle DCM. Near the magnetic poles
//! $\tan I$ grows without bound; the survey tables never reach ±90° so this is not special-cased.
use crate::geomag;
use crate::{constrain, wrap_to_180};
use ::nalgebra::{Matrix3, Rotation3, Vector3};
use ::nav_types::{ECEF, WGS84};

// International Standard Atmosphere, troposphere layer
/// Sea level standard temperature in kelvin ($T_0$)
pub const SEA_LEVEL_TEMPERATURE: f64 = 288.15;
/// Sea level standard pressure in pascals ($P_0$)
pub const SEA_LEVEL_PRESSURE: f64 = 101325.0;
/// Sea level standard air density in $kg/m^3$ ($\rho_0$)
pub const SEA_LEVEL_DENSITY: f64 = 1.225;
/// Tropospheric temperature lapse rate in K/m ($L$)
pub const TEMPERATURE_LAPSE_RATE: f64 = 0.0065;
/// Molar mass of dry air in kg/mol ($M$)
pub const AIR_MOLAR_MASS: f64 = 0.0289644;
/// Universal gas constant in J/(mol K) ($R$)
pub const GAS_CONSTANT: f64 = 8.3144598;
/// Exponent of the temperature ratio in the ISA density relation
pub const DENSITY_EXPONENT: f64 = 4.256;
/// Offset used to report temperatures in degrees Celsius
pub const KELVIN_OFFSET: f64 = 273.0;
/// Survey strength tables are tabulated in units of 0.01 Gauss
pub const STRENGTH_TO_GAUSS: f64 = 0.01;

/// Rotation from the local-level (NED) frame to the Earth-centered Earth-fixed (ECEF) frame.
///
/// The local-level frame is tangent to the WGS84 ellipsoid at the given latitude and longitude.
/// The columns of the returned matrix are the north, east and down unit vectors expressed in
/// ECEF. The transpose maps ECEF vectors into NED.
///
/// # Parameters
/// - `latitude` - The WGS84 latitude in degrees
/// - `longitude` - The WGS84 longitude in degrees
///
/// # Returns
/// A 3x3 rotation matrix that converts from the local-level frame to the ECEF frame
pub fn ned_to_ecef(latitude: &f64, longitude: &f64) -> Matrix3<f64> {
    let lat: f64 = (*latitude).to_radians();
    let lon: f64 = (*longitude).to_radians();

    let mut rot: Matrix3<f64> = Matrix3::zeros();
    rot[(0, 0)] = -lat.sin() * lon.cos();
    rot[(1, 0)] = -lat.sin() * lon.sin();
    rot[(2, 0)] = lat.cos();
    rot[(0, 1)] = -lon.sin();
    rot[(1, 1)] = lon.cos();
    rot[(0, 2)] = -lat.cos() * lon.cos();
    rot[(1, 2)] = -lat.cos() * lon.sin();
    rot[(2, 2)] = -lat.sin();
    rot
}
/// Convert a local NED position relative to a home point into WGS84 coordinates.
///
/// The offset is rotated into ECEF at the home position and added to the home point, and the
/// result converted back to geodetic coordinates with `nav-types`. The home latitude is clamped
/// to the valid range and the home longitude wrapped to ±180°. Non-finite inputs yield NaN.
///
/// # Parameters
/// - `position_ned` - North, east, down offset from home in meters
/// - `home_latitude` - WGS84 latitude of the home point in degrees
/// - `home_longitude` - WGS84 longitude of the home point in degrees
/// - `home_altitude` - WGS84 altitude of the home point in meters
///
/// # Returns
/// A tuple (latitude, longitude, altitude) in degrees, degrees and meters
///
/// # Example
/// ```rust
/// use nalgebra::Vector3;
/// use quadsim::earth;
/// let (lat, lon, alt) = earth::ned_to_lla(&Vector3::new(0.0, 0.0, -10.0), 47.397742, 8.545594, 488.0);
/// assert!((lat - 47.397742).abs() < 1e-8);
/// assert!((alt - 498.0).abs() < 1e-2);
/// ```
pub fn ned_to_lla(
    position_ned: &Vector3<f64>,
    home_latitude: f64,
    home_longitude: f64,
    home_altitude: f64,
) -> (f64, f64, f64) {
    if !(position_ned.iter().all(|v| v.is_finite())
        && home_latitude.is_finite()
        && home_longitude.is_finite()
        && home_altitude.is_finite())
    {
        return (f64::NAN, f64::NAN, f64::NAN);
    }
    let latitude = constrain(home_latitude, -90.0, 90.0);
    let longitude = wrap_to_180(home_longitude);
    let home: WGS84<f64> = WGS84::from_degrees_and_meters(latitude, longitude, home_altitude);
    let home_ecef: ECEF<f64> = ECEF::from(home);
    let offset: Vector3<f64> = ned_to_ecef(&latitude, &longitude) * position_ned;
    let ecef: ECEF<f64> = ECEF::new(
        home_ecef.x() + offset[0],
        home_ecef.y() + offset[1],
        home_ecef.z() + offset[2],
    );
    let wgs84: WGS84<f64> = WGS84::from(ecef);
    (
        wgs84.latitude_degrees(),
        wrap_to_180(wgs84.longitude_degrees()),
        wgs84.altitude(),
    )
}
/// Earth-to-body direction cosine matrix from Euler angles.
///
/// Uses the aerospace yaw-pitch-roll sequence. `nalgebra` builds the body-to-local rotation
/// $C_b^n$ from the same angles; the transpose is returned so the result maps local-level
/// vectors into the body frame.
///
/// # Parameters
/// - `roll`, `pitch`, `yaw` - Euler angles in radians
///
/// # Example
/// ```rust
/// use quadsim::earth;
/// let dcm = earth::dcm_from_euler(0.0, 0.0, 0.3);
/// assert!((dcm - earth::dcm_from_yaw(0.3)).norm() < 1e-12);
/// ```
pub fn dcm_from_euler(roll: f64, pitch: f64, yaw: f64) -> Matrix3<f64> {
    Rotation3::from_euler_angles(roll, pitch, yaw)
        .matrix()
        .transpose()
}
/// Earth-to-body direction cosine matrix for a level vehicle at the given heading (radians)
pub fn dcm_from_yaw(yaw: f64) -> Matrix3<f64> {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    Matrix3::new(
        cos_yaw, sin_yaw, 0.0, //
        -sin_yaw, cos_yaw, 0.0, //
        0.0, 0.0, 1.0,
    )
}
/// Rotate a local-level vector into the body frame with an Earth-to-body DCM
pub fn earth_to_body_rotation(dcm: &Matrix3<f64>, vector_earth: &Vector3<f64>) -> Vector3<f64> {
    dcm * vector_earth
}
/// Declination, inclination and strength of the geomagnetic field at a point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MagneticElements {
    /// Declination in radians, positive east of true north
    pub declination: f64,
    /// Inclination in radians, positive below the horizontal
    pub inclination: f64,
    /// Total field strength in Gauss
    pub strength: f64,
}
/// Look up the magnetic field elements at a geodetic position.
///
/// Positions outside the geodetic range read as all zeros (see [`geomag::interpolate`]).
///
/// # Parameters
/// - `latitude` - The WGS84 latitude in degrees
/// - `longitude` - The WGS84 longitude in degrees
pub fn magnetic_elements(latitude: f64, longitude: f64) -> MagneticElements {
    MagneticElements {
        declination: geomag::magnetic_declination(latitude, longitude).to_radians(),
        inclination: geomag::magnetic_inclination(latitude, longitude).to_radians(),
        strength: STRENGTH_TO_GAUSS * geomag::magnetic_strength(latitude, longitude),
    }
}
/// Calculate the Earth's magnetic field in the local-level frame
///
/// # Parameters
/// - `latitude` - The WGS84 latitude in degrees
/// - `longitude` - The WGS84 longitude in degrees
///
/// # Returns
/// The magnetic field vector in Gauss in the local-level frame (North, East, Down)
///
/// # Example
/// ```rust
/// use quadsim::earth;
/// let field = earth::earth_magnetic_field(0.0, 0.0);
/// // 0.32 G total intensity at 0N 0E
/// assert!((field.norm() - 0.32).abs() < 1e-12);
/// ```
pub fn earth_magnetic_field(latitude: f64, longitude: f64) -> Vector3<f64> {
    let elements = magnetic_elements(latitude, longitude);
    let horizontal = elements.strength * elements.inclination.cos();
    Vector3::new(
        horizontal * elements.declination.cos(),
        horizontal * elements.declination.sin(),
        horizontal * elements.inclination.tan(),
    )
}
/// Calculate the Earth's magnetic field as seen in the vehicle body frame
///
/// # Parameters
/// - `latitude` - The WGS84 latitude in degrees
/// - `longitude` - The WGS84 longitude in degrees
/// - `dcm` - Earth-to-body direction cosine matrix of the vehicle
///
/// # Returns
/// The magnetic field vector in Gauss in the body frame
pub fn compute_body_field(latitude: f64, longitude: f64, dcm: &Matrix3<f64>) -> Vector3<f64> {
    earth_to_body_rotation(dcm, &earth_magnetic_field(latitude, longitude))
}
/// State of the standard atmosphere at an altitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Atmosphere {
    /// Static air temperature in kelvin
    pub temperature: f64,
    /// Static pressure in pascals
    pub pressure: f64,
    /// Air density in $kg/m^3$
    pub density: f64,
}
/// International Standard Atmosphere model of the troposphere
///
/// Valid up to 11 km above mean sea level.
///
/// $$
/// T = T_0 - L h, \qquad P = P_0 \left(\frac{T}{T_0}\right)^{\frac{g M}{R L}}, \qquad \rho = \rho_0 \left(\frac{T}{T_0}\right)^{4.256}
/// $$
///
/// # Parameters
/// - `altitude` - Altitude above mean sea level in meters
///
/// # Example
/// ```rust
/// use quadsim::earth;
/// let sea_level = earth::isa_atmosphere(0.0);
/// assert_eq!(sea_level.pressure, earth::SEA_LEVEL_PRESSURE);
/// ```
pub fn isa_atmosphere(altitude: f64) -> Atmosphere {
    let temperature = SEA_LEVEL_TEMPERATURE - TEMPERATURE_LAPSE_RATE * altitude;
    let temperature_ratio = SEA_LEVEL_TEMPERATURE / temperature;
    let pressure_ratio = temperature_ratio
        .powf((crate::GRAVITY * AIR_MOLAR_MASS) / (GAS_CONSTANT * TEMPERATURE_LAPSE_RATE));
    Atmosphere {
        temperature,
        pressure: SEA_LEVEL_PRESSURE / pressure_ratio,
        density: SEA_LEVEL_DENSITY / temperature_ratio.powf(DENSITY_EXPONENT),
    }
}
// === Unit tests ===
#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const HOME_LATITUDE: f64 = 47.397742;
    const HOME_LONGITUDE: f64 = 8.545594;

    /// Meridian radius and parallel-circle radius on the WGS84 ellipsoid
    fn curvature_radii(latitude: f64, altitude: f64) -> (f64, f64) {
        let a = 6378137.0;
        let e2 = 0.0818191908425_f64.powi(2);
        let sin_sq = latitude.to_radians().sin().powi(2);
        let r_n = a * (1.0 - e2) / (1.0 - e2 * sin_sq).powf(1.5);
        let r_e = a / (1.0 - e2 * sin_sq).sqrt();
        (r_n, (r_e + altitude) * latitude.to_radians().cos())
    }
    #[test]
    fn ned_to_ecef_is_orthonormal() {
        let rot = ned_to_ecef(&HOME_LATITUDE, &HOME_LONGITUDE);
        let identity = rot * rot.transpose();
        for i in 0..3 {
            for j in 0..3 {
                assert_approx_eq!(identity[(i, j)], if i == j { 1.0 } else { 0.0 }, 1e-12);
            }
        }
        // Down points toward the Earth's center on the equator
        let rot = ned_to_ecef(&0.0, &0.0);
        assert_approx_eq!(rot[(0, 2)], -1.0, 1e-12);
        assert_approx_eq!(rot[(2, 0)], 1.0, 1e-12);
        assert_approx_eq!(rot[(1, 1)], 1.0, 1e-12);
    }
    #[test]
    fn ned_to_lla_origin_is_home() {
        let (lat, lon, alt) = ned_to_lla(&Vector3::zeros(), HOME_LATITUDE, HOME_LONGITUDE, 488.0);
        assert_approx_eq!(lat, HOME_LATITUDE, 1e-8);
        assert_approx_eq!(lon, HOME_LONGITUDE, 1e-8);
        assert_approx_eq!(alt, 488.0, 1e-2);
    }
    #[test]
    fn ned_to_lla_small_offsets() {
        let (r_n, r_p) = curvature_radii(HOME_LATITUDE, 488.0);
        let (lat, lon, alt) = ned_to_lla(
            &Vector3::new(100.0, 0.0, 0.0),
            HOME_LATITUDE,
            HOME_LONGITUDE,
            488.0,
        );
        assert_approx_eq!(lat - HOME_LATITUDE, (100.0 / (r_n + 488.0)).to_degrees(), 1e-7);
        assert_approx_eq!(lon, HOME_LONGITUDE, 1e-8);
        assert_approx_eq!(alt, 488.0, 1e-2);

        let (lat, lon, alt) = ned_to_lla(
            &Vector3::new(0.0, 100.0, -20.0),
            HOME_LATITUDE,
            HOME_LONGITUDE,
            488.0,
        );
        assert_approx_eq!(lat, HOME_LATITUDE, 1e-6);
        assert_approx_eq!(lon - HOME_LONGITUDE, (100.0 / r_p).to_degrees(), 1e-7);
        assert_approx_eq!(alt, 508.0, 1e-2);
    }
    #[test]
    fn ned_to_lla_non_finite() {
        let (lat, lon, alt) = ned_to_lla(&Vector3::new(f64::NAN, 0.0, 0.0), 0.0, 0.0, 0.0);
        assert!(lat.is_nan() && lon.is_nan() && alt.is_nan());
    }
    #[test]
    fn ned_to_lla_wraps_huge_home_longitude() {
        let (_, lon, _) = ned_to_lla(&Vector3::zeros(), HOME_LATITUDE, 1e20, 488.0);
        assert!((-180.0..=180.0).contains(&lon));
        let (_, lon, _) = ned_to_lla(&Vector3::zeros(), HOME_LATITUDE, 370.0, 488.0);
        assert_approx_eq!(lon, 10.0, 1e-8);
    }
    #[test]
    fn dcm_from_euler_matches_yaw_only() {
        for yaw in [-3.0, -1.2, 0.0, 0.4, std::f64::consts::FRAC_PI_2, 3.1] {
            let a = dcm_from_euler(0.0, 0.0, yaw);
            let b = dcm_from_yaw(yaw);
            for i in 0..3 {
                for j in 0..3 {
                    assert_approx_eq!(a[(i, j)], b[(i, j)], 1e-12);
                }
            }
        }
    }
    #[test]
    fn dcm_maps_down_through_pitch() {
        // Nose up by 90 degrees: local down lies along body -x
        let dcm = dcm_from_euler(0.0, std::f64::consts::FRAC_PI_2, 0.0);
        let down = earth_to_body_rotation(&dcm, &Vector3::new(0.0, 0.0, 1.0));
        assert_approx_eq!(down[0], -1.0, 1e-12);
        assert_approx_eq!(down[1], 0.0, 1e-12);
        assert_approx_eq!(down[2], 0.0, 1e-12);
    }
    #[test]
    fn earth_field_at_grid_node() {
        // 0N 0E: declination -5, inclination -30, strength 32
        let field = earth_magnetic_field(0.0, 0.0);
        let horizontal = 0.32 * 30.0_f64.to_radians().cos();
        assert_approx_eq!(field[0], horizontal * 5.0_f64.to_radians().cos(), 1e-12);
        assert_approx_eq!(field[1], -horizontal * 5.0_f64.to_radians().sin(), 1e-12);
        assert_approx_eq!(field[2], -0.16, 1e-12);
        assert_approx_eq!(field.norm(), 0.32, 1e-12);
    }
    #[test]
    fn earth_field_at_home() {
        let field = earth_magnetic_field(HOME_LATITUDE, HOME_LONGITUDE);
        assert_approx_eq!(field[0], 0.21614599837544876, 1e-9);
        assert_approx_eq!(field[1], 0.009677831226331127, 1e-9);
        assert_approx_eq!(field[2], 0.429298334522774, 1e-9);
        let elements = magnetic_elements(HOME_LATITUDE, HOME_LONGITUDE);
        assert_approx_eq!(field.norm(), elements.strength, 1e-12);
    }
    #[test]
    fn earth_field_out_of_range_is_zero() {
        assert_eq!(earth_magnetic_field(95.0, 0.0), Vector3::zeros());
        assert_eq!(
            compute_body_field(0.0, -200.0, &dcm_from_euler(0.1, 0.2, 0.3)),
            Vector3::zeros()
        );
    }
    #[test]
    fn body_field_rotates_with_heading() {
        let earth = earth_magnetic_field(HOME_LATITUDE, HOME_LONGITUDE);
        let body = compute_body_field(HOME_LATITUDE, HOME_LONGITUDE, &Matrix3::identity());
        assert_eq!(body, earth);
        // Facing east, magnetic north appears on the vehicle's left
        let body = compute_body_field(
            HOME_LATITUDE,
            HOME_LONGITUDE,
            &dcm_from_yaw(std::f64::consts::FRAC_PI_2),
        );
        assert_approx_eq!(body[0], earth[1], 1e-12);
        assert_approx_eq!(body[1], -earth[0], 1e-12);
        assert_approx_eq!(body[2], earth[2], 1e-12);
        // Rotation preserves the field magnitude
        let body = compute_body_field(HOME_LATITUDE, HOME_LONGITUDE, &dcm_from_euler(0.3, -0.2, 2.0));
        assert_approx_eq!(body.norm(), earth.norm(), 1e-12);
    }
    #[test]
    fn isa_atmosphere() {
        let sea_level = super::isa_atmosphere(0.0);
        assert_approx_eq!(sea_level.temperature, SEA_LEVEL_TEMPERATURE);
        assert_approx_eq!(sea_level.pressure, SEA_LEVEL_PRESSURE);
        assert_approx_eq!(sea_level.density, SEA_LEVEL_DENSITY);
        let one_km = super::isa_atmosphere(1000.0);
        assert_approx_eq!(one_km.temperature, 281.65, 1e-9);
        assert_approx_eq!(one_km.pressure, 89874.75, 0.01);
        assert_approx_eq!(one_km.density, 1.11164, 1e-5);
    }
}
