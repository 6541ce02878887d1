//! Geomagnetic survey tables and grid interpolation
//!
//! This module holds the coarse global survey of the Earth's magnetic field used by the
//! magnetometer model. Three quantities are tabulated on the same 10 degree grid:
//!
//! - declination (degrees, positive east of true north)
//! - inclination (degrees, positive below the horizontal)
//! - total strength (centi-Tesla scale, i.e. Gauss × 100)
//!
//! Each table has 13 latitude rows spanning -60° to 60° and 37 longitude columns spanning
//! -180° to 180°. The data was generated with the NOAA IGRF grid calculator (January 2018)
//! and is compiled into the binary; there is no secular-variation update.
//!
//! # Interpolation
//!
//! A query at $(\phi, \lambda)$ is bucketed to the lower-left grid corner by truncating
//! $\phi / 10$ and $\lambda / 10$ toward zero. The corner is clamped into the table so that
//! the neighbouring row and column always exist, and the four surrounding samples are blended
//! bilinearly:
//!
//! $$
//! v = (1 - s_\phi)\left[(1 - s_\lambda) v_{sw} + s_\lambda v_{se}\right] + s_\phi\left[(1 - s_\lambda) v_{nw} + s_\lambda v_{ne}\right]
//! $$
//!
//! where the fractional offsets $s_\phi, s_\lambda$ are clamped to $[0, 1]$. Latitudes beyond the
//! table coverage therefore read the nearest edge row. Queries outside the geodetic range
//! (or NaN) return exactly `0.0`, the "no data" value.
//!
//! Note that truncation toward zero buckets negative coordinates one cell differently from
//! a floor-based scheme. Inside the negative quadrants the fractional offset is clamped to
//! zero, so the field is piecewise constant along that axis there.
use crate::constrain;

/// Grid spacing of the survey tables in degrees
pub const SAMPLING_RESOLUTION: f64 = 10.0;
/// Southern edge of the table coverage in degrees
pub const SAMPLING_MIN_LATITUDE: f64 = -60.0;
/// Northern edge of the table coverage in degrees
pub const SAMPLING_MAX_LATITUDE: f64 = 60.0;
/// Western edge of the table coverage in degrees
pub const SAMPLING_MIN_LONGITUDE: f64 = -180.0;
/// Eastern edge of the table coverage in degrees
pub const SAMPLING_MAX_LONGITUDE: f64 = 180.0;
/// Number of latitude rows in each table
pub const GRID_ROWS: usize = 13;
/// Number of longitude columns in each table
pub const GRID_COLS: usize = 37;

/// The physical quantity tabulated by a [`GeomagneticGrid`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeomagneticQuantity {
    /// Angle between magnetic north and true north, degrees
    Declination,
    /// Dip angle of the field below the local horizontal, degrees
    Inclination,
    /// Total field intensity, centi-Tesla scale (Gauss × 100)
    Strength,
}

/// Immutable 13 × 37 table of integer survey samples.
///
/// Row 0 is latitude -60°, column 0 is longitude -180°. The three instances are
/// [`DECLINATION`], [`INCLINATION`] and [`STRENGTH`]; they are plain static data and are
/// safe to read from any number of threads.
#[derive(Debug)]
pub struct GeomagneticGrid {
    quantity: GeomagneticQuantity,
    samples: [[i8; GRID_COLS]; GRID_ROWS],
}
impl GeomagneticGrid {
    /// Which quantity this table holds
    pub const fn quantity(&self) -> GeomagneticQuantity {
        self.quantity
    }
    /// Raw sample at `(row, col)`, or `None` outside the table
    pub fn sample(&self, row: usize, col: usize) -> Option<f64> {
        self.samples
            .get(row)
            .and_then(|r| r.get(col))
            .map(|&v| f64::from(v))
    }
    /// Latitude in degrees of a table row
    pub fn row_latitude(row: usize) -> f64 {
        SAMPLING_MIN_LATITUDE + row as f64 * SAMPLING_RESOLUTION
    }
    /// Longitude in degrees of a table column
    pub fn col_longitude(col: usize) -> f64 {
        SAMPLING_MIN_LONGITUDE + col as f64 * SAMPLING_RESOLUTION
    }
}

/// Magnetic declination survey, degrees
pub static DECLINATION: GeomagneticGrid = GeomagneticGrid {
    quantity: GeomagneticQuantity::Declination,
    samples: DECLINATION_SAMPLES,
};
/// Magnetic inclination survey, degrees
pub static INCLINATION: GeomagneticGrid = GeomagneticGrid {
    quantity: GeomagneticQuantity::Inclination,
    samples: INCLINATION_SAMPLES,
};
/// Magnetic field strength survey, centi-Tesla scale
pub static STRENGTH: GeomagneticGrid = GeomagneticGrid {
    quantity: GeomagneticQuantity::Strength,
    samples: STRENGTH_SAMPLES,
};

/// Convert a bucketed coordinate into a table index.
///
/// The coordinate is clamped into `[min, max - SAMPLING_RESOLUTION]` so that `index + 1` is
/// always a valid row or column for the bilinear stencil. Returns the index together with the
/// clamped coordinate, which is the reference point for the fractional offset.
///
/// # Example
/// ```rust
/// use quadsim::geomag::lookup_table_index;
/// assert_eq!(lookup_table_index(0.0, -60.0, 60.0), (6, 0.0));
/// assert_eq!(lookup_table_index(80.0, -60.0, 60.0), (11, 50.0));
/// ```
pub fn lookup_table_index(value: f64, min: f64, max: f64) -> (usize, f64) {
    let clamped = constrain(value, min, max - SAMPLING_RESOLUTION);
    (((clamped - min) / SAMPLING_RESOLUTION) as usize, clamped)
}

/// Bilinearly interpolate one survey table at a geodetic position.
///
/// # Parameters
/// - `latitude` - WGS84 latitude in degrees
/// - `longitude` - WGS84 longitude in degrees
/// - `grid` - the table to sample
///
/// # Returns
/// The interpolated value in the table's units, or exactly `0.0` if the position is outside
/// $[-90, 90] \times [-180, 180]$.
///
/// # Example
/// ```rust
/// use quadsim::geomag::{interpolate, DECLINATION};
/// // 0°N 0°E is a grid node, so the raw sample comes back unchanged
/// assert_eq!(interpolate(0.0, 0.0, &DECLINATION), -5.0);
/// assert_eq!(interpolate(91.0, 0.0, &DECLINATION), 0.0);
/// ```
pub fn interpolate(latitude: f64, longitude: f64, grid: &GeomagneticGrid) -> f64 {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return 0.0;
    }
    // Integer-cast bucketing: rounds toward zero, not toward -inf
    let min_lat = (latitude / SAMPLING_RESOLUTION).trunc() * SAMPLING_RESOLUTION;
    let min_lon = (longitude / SAMPLING_RESOLUTION).trunc() * SAMPLING_RESOLUTION;

    let (row, min_lat) = lookup_table_index(min_lat, SAMPLING_MIN_LATITUDE, SAMPLING_MAX_LATITUDE);
    let (col, min_lon) =
        lookup_table_index(min_lon, SAMPLING_MIN_LONGITUDE, SAMPLING_MAX_LONGITUDE);
    debug_assert!(row + 1 < GRID_ROWS && col + 1 < GRID_COLS);

    let samples = &grid.samples;
    let data_sw = f64::from(samples[row][col]);
    let data_se = f64::from(samples[row][col + 1]);
    let data_ne = f64::from(samples[row + 1][col + 1]);
    let data_nw = f64::from(samples[row + 1][col]);

    let lat_scale = constrain((latitude - min_lat) / SAMPLING_RESOLUTION, 0.0, 1.0);
    let lon_scale = constrain((longitude - min_lon) / SAMPLING_RESOLUTION, 0.0, 1.0);

    let data_min = lon_scale * (data_se - data_sw) + data_sw;
    let data_max = lon_scale * (data_ne - data_nw) + data_nw;
    lat_scale * (data_max - data_min) + data_min
}

/// Magnetic declination in degrees at a geodetic position
pub fn magnetic_declination(latitude: f64, longitude: f64) -> f64 {
    interpolate(latitude, longitude, &DECLINATION)
}
/// Magnetic inclination in degrees at a geodetic position
pub fn magnetic_inclination(latitude: f64, longitude: f64) -> f64 {
    interpolate(latitude, longitude, &INCLINATION)
}
/// Magnetic field strength (centi-Tesla scale) at a geodetic position
pub fn magnetic_strength(latitude: f64, longitude: f64) -> f64 {
    interpolate(latitude, longitude, &STRENGTH)
}

// IGRF grid, 22 Jan 2018. Rows run south to north, columns west to east.
#[rustfmt::skip]
const DECLINATION_SAMPLES: [[i8; GRID_COLS]; GRID_ROWS] = [
    [
        47, 46, 45, 43, 42, 41, 39, 37, 33, 29, 23, 16, 10, 4, -1, -6, -10, -15, -20,
        -27, -34, -42, -49, -56, -62, -67, -72, -74, -75, -73, -61, -22, 26, 42, 47, 48, 47,
    ], // -60
    [
        31, 31, 31, 30, 30, 30, 30, 29, 27, 24, 18, 11, 3, -4, -9, -13, -15, -18, -21,
        -27, -33, -40, -47, -52, -56, -57, -56, -52, -44, -30, -14, 2, 14, 22, 27, 30, 31,
    ], // -50
    [
        22, 23, 23, 23, 22, 22, 22, 23, 22, 19, 13, 5, -4, -12, -17, -20, -22, -22, -23,
        -25, -30, -36, -41, -45, -46, -44, -39, -31, -21, -11, -3, 4, 10, 15, 19, 21, 22,
    ], // -40
    [
        17, 17, 17, 18, 17, 17, 17, 17, 16, 13, 8, -1, -10, -18, -22, -25, -26, -25, -22,
        -20, -21, -25, -29, -32, -31, -28, -23, -16, -9, -3, 0, 4, 7, 11, 14, 16, 17,
    ], // -30
    [
        13, 13, 14, 14, 14, 13, 13, 12, 11, 9, 3, -5, -14, -20, -24, -25, -24, -21, -17,
        -12, -9, -11, -14, -17, -18, -16, -12, -8, -3, 0, 1, 3, 6, 8, 11, 12, 13,
    ], // -20
    [
        11, 11, 11, 11, 11, 10, 10, 10, 9, 6, 0, -8, -15, -21, -23, -22, -19, -15, -10,
        -5, -2, -2, -4, -7, -9, -8, -7, -4, -1, 1, 1, 2, 4, 7, 9, 10, 11,
    ], // -10
    [
        10, 9, 9, 9, 9, 9, 9, 8, 7, 3, -3, -10, -16, -20, -20, -18, -14, -9, -5,
        -2, 1, 2, 0, -2, -4, -4, -3, -2, 0, 0, 0, 1, 3, 5, 7, 9, 10,
    ], // +0
    [
        9, 9, 9, 9, 9, 9, 9, 8, 6, 1, -4, -11, -16, -18, -17, -14, -10, -5, -2,
        0, 2, 3, 2, 0, -1, -2, -2, -1, 0, -1, -1, -1, 1, 3, 6, 8, 9,
    ], // +10
    [
        8, 9, 9, 10, 10, 10, 10, 8, 5, 0, -6, -12, -15, -16, -15, -11, -7, -4, -1,
        1, 3, 4, 3, 2, 1, 0, 0, 0, -1, -2, -3, -4, -2, 0, 3, 6, 8,
    ], // +20
    [
        7, 9, 10, 11, 12, 12, 12, 9, 5, -1, -7, -13, -15, -15, -13, -10, -6, -3, 0,
        2, 3, 4, 4, 4, 3, 2, 1, 0, -1, -3, -5, -6, -6, -3, 0, 4, 7,
    ], // +30
    [
        5, 8, 11, 13, 14, 15, 14, 11, 5, -2, -9, -15, -17, -16, -13, -10, -6, -3, 0,
        3, 4, 5, 6, 6, 6, 5, 4, 2, -1, -5, -8, -9, -9, -6, -3, 1, 5,
    ], // +40
    [
        3, 8, 11, 15, 17, 17, 16, 12, 5, -4, -12, -18, -19, -18, -16, -12, -8, -4, 0,
        3, 5, 7, 9, 10, 10, 9, 7, 4, -1, -6, -10, -12, -12, -9, -5, -1, 3,
    ], // +50
    [
        3, 8, 12, 16, 19, 20, 18, 13, 4, -8, -18, -24, -25, -23, -20, -16, -11, -6, -1,
        3, 7, 11, 14, 16, 17, 17, 14, 8, 0, -8, -13, -15, -14, -11, -7, -2, 3,
    ], // +60
];

#[rustfmt::skip]
const INCLINATION_SAMPLES: [[i8; GRID_COLS]; GRID_ROWS] = [
    [
        -78, -76, -74, -72, -70, -68, -65, -63, -60, -57, -55, -54, -54, -55, -56, -57, -58, -59, -59,
        -59, -59, -60, -61, -63, -66, -69, -73, -76, -79, -83, -86, -87, -86, -84, -82, -80, -78,
    ], // -60
    [
        -72, -70, -68, -66, -64, -62, -60, -57, -54, -51, -49, -48, -49, -51, -55, -58, -60, -61, -61,
        -61, -60, -60, -61, -63, -66, -69, -72, -76, -78, -80, -81, -80, -79, -77, -76, -74, -72,
    ], // -50
    [
        -64, -62, -60, -59, -57, -55, -53, -50, -47, -44, -41, -41, -43, -47, -53, -58, -62, -65, -66,
        -65, -63, -62, -61, -63, -65, -68, -71, -73, -74, -74, -73, -72, -71, -70, -68, -66, -64,
    ], // -40
    [
        -55, -53, -51, -49, -46, -44, -42, -40, -37, -33, -30, -30, -34, -41, -48, -55, -60, -65, -67,
        -68, -66, -63, -61, -61, -62, -64, -65, -66, -66, -65, -64, -63, -62, -61, -59, -57, -55,
    ], // -30
    [
        -42, -40, -37, -35, -33, -30, -28, -25, -22, -18, -15, -16, -22, -31, -40, -48, -55, -59, -62,
        -63, -61, -58, -55, -53, -53, -54, -55, -55, -54, -53, -51, -51, -50, -49, -47, -45, -42,
    ], // -20
    [
        -25, -22, -20, -17, -15, -12, -10, -7, -3, 1, 3, 2, -5, -16, -27, -37, -44, -48, -50,
        -50, -48, -44, -41, -38, -38, -38, -39, -39, -38, -37, -36, -35, -35, -34, -31, -28, -25,
    ], // -10
    [
        -5, -2, 1, 3, 5, 8, 10, 13, 16, 20, 21, 19, 12, 2, -10, -20, -27, -30, -30,
        -29, -27, -23, -19, -17, -17, -17, -18, -18, -17, -16, -16, -16, -16, -15, -12, -9, -5,
    ], // +0
    [
        15, 18, 21, 22, 24, 26, 29, 31, 34, 36, 37, 34, 28, 20, 10, 2, -3, -5, -5,
        -4, -2, 2, 5, 7, 8, 7, 7, 6, 7, 7, 7, 6, 5, 6, 8, 11, 15,
    ], // +10
    [
        31, 34, 36, 38, 39, 41, 43, 46, 48, 49, 49, 46, 42, 36, 29, 24, 20, 19, 20,
        21, 23, 25, 28, 30, 30, 30, 29, 29, 29, 29, 28, 27, 25, 25, 26, 28, 31,
    ], // +20
    [
        43, 45, 47, 49, 51, 53, 55, 57, 58, 59, 59, 56, 53, 49, 45, 42, 40, 40, 40,
        41, 43, 44, 46, 47, 47, 47, 47, 47, 47, 47, 46, 44, 42, 41, 40, 42, 43,
    ], // +30
    [
        53, 54, 56, 57, 59, 61, 64, 66, 67, 68, 67, 65, 62, 60, 57, 55, 55, 54, 55,
        56, 57, 58, 59, 59, 60, 60, 60, 60, 60, 60, 59, 57, 55, 53, 52, 52, 53,
    ], // +40
    [
        62, 63, 64, 65, 67, 69, 71, 73, 75, 75, 74, 73, 70, 68, 67, 66, 65, 65, 65,
        66, 66, 67, 68, 68, 69, 70, 70, 71, 71, 70, 69, 67, 65, 63, 62, 62, 62,
    ], // +50
    [
        71, 71, 72, 73, 75, 77, 78, 80, 81, 81, 80, 79, 77, 76, 74, 73, 73, 73, 73,
        73, 73, 74, 74, 75, 76, 77, 78, 78, 78, 78, 77, 75, 73, 72, 71, 71, 71,
    ], // +60
];

#[rustfmt::skip]
const STRENGTH_SAMPLES: [[i8; GRID_COLS]; GRID_ROWS] = [
    [
        62, 60, 58, 56, 54, 52, 49, 46, 43, 41, 38, 36, 34, 32, 31, 31, 30, 30, 30,
        31, 33, 35, 38, 42, 46, 51, 55, 59, 62, 64, 66, 67, 67, 66, 65, 64, 62,
    ], // -60
    [
        59, 56, 54, 52, 50, 47, 44, 41, 38, 35, 32, 29, 28, 27, 26, 26, 26, 25, 25,
        26, 28, 30, 34, 39, 44, 49, 54, 58, 61, 64, 65, 66, 65, 64, 63, 61, 59,
    ], // -50
    [
        54, 52, 49, 47, 45, 42, 40, 37, 34, 30, 27, 25, 24, 24, 24, 24, 24, 24, 24,
        24, 25, 28, 32, 37, 42, 48, 52, 56, 59, 61, 62, 62, 62, 60, 59, 56, 54,
    ], // -40
    [
        49, 47, 44, 42, 40, 37, 35, 33, 30, 28, 25, 23, 22, 23, 23, 24, 25, 25, 26,
        26, 26, 28, 31, 36, 41, 46, 51, 54, 56, 57, 57, 57, 56, 55, 53, 51, 49,
    ], // -30
    [
        43, 41, 39, 37, 35, 33, 32, 30, 28, 26, 25, 23, 23, 23, 24, 25, 26, 28, 29,
        29, 29, 30, 32, 36, 40, 44, 48, 51, 52, 52, 51, 51, 50, 49, 47, 45, 43,
    ], // -20
    [
        38, 36, 35, 33, 32, 31, 30, 29, 28, 27, 26, 25, 24, 24, 25, 26, 28, 30, 31,
        32, 32, 32, 33, 35, 38, 42, 44, 46, 47, 46, 45, 45, 44, 43, 41, 40, 38,
    ], // -10
    [
        34, 33, 32, 32, 31, 31, 31, 30, 30, 30, 29, 28, 27, 27, 27, 28, 29, 31, 32,
        33, 33, 33, 34, 35, 37, 39, 41, 42, 43, 42, 41, 40, 39, 38, 36, 35, 34,
    ], // +0
    [
        33, 33, 32, 32, 33, 33, 34, 34, 35, 35, 34, 33, 32, 31, 30, 30, 31, 32, 33,
        34, 35, 35, 36, 37, 38, 40, 41, 42, 42, 41, 40, 39, 37, 36, 34, 33, 33,
    ], // +10
    [
        34, 34, 34, 35, 36, 37, 39, 40, 41, 41, 40, 39, 37, 35, 35, 34, 35, 35, 36,
        37, 38, 39, 40, 41, 42, 43, 44, 45, 45, 45, 43, 41, 39, 37, 35, 34, 34,
    ], // +20
    [
        37, 37, 38, 39, 41, 42, 44, 46, 47, 47, 46, 45, 43, 41, 40, 39, 39, 40, 41,
        41, 42, 43, 45, 46, 47, 48, 49, 50, 50, 50, 48, 46, 43, 41, 39, 38, 37,
    ], // +30
    [
        42, 42, 43, 44, 46, 48, 50, 52, 53, 53, 52, 51, 49, 47, 45, 45, 44, 44, 45,
        46, 46, 47, 48, 50, 51, 53, 54, 55, 56, 55, 54, 52, 49, 46, 44, 43, 42,
    ], // +40
    [
        48, 48, 49, 50, 52, 53, 55, 56, 57, 57, 56, 55, 53, 51, 50, 49, 48, 48, 48,
        49, 49, 50, 51, 53, 55, 56, 58, 59, 60, 60, 58, 56, 54, 52, 50, 49, 48,
    ], // +50
    [
        54, 54, 54, 55, 56, 57, 58, 58, 59, 58, 58, 57, 56, 54, 53, 52, 51, 51, 51,
        51, 52, 53, 54, 55, 57, 58, 60, 61, 62, 61, 61, 59, 58, 56, 55, 54, 54,
    ], // +60
];
