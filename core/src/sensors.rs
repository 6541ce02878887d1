//! Simulated onboard sensors
//!
//! Each sensor follows the same two-phase lifecycle: construction initialises it with a
//! sensible reading at the home position, and `update` is called once per simulation tick
//! with the true vehicle state to produce the next reading. A sensor cannot be updated
//! before it exists, so there is no separate "uninitialised" state to guard against.
//!
//! - [`GpsSensor`]: geodetic position and NED velocity, ground speed and course
//! - [`ImuSensor`]: specific force and angular rate in the body frame
//! - [`MagSensor`]: Earth magnetic field in the body frame (see [`crate::earth::compute_body_field`])
//! - [`BaroSensor`]: static/differential pressure, pressure altitude and temperature (ISA)
//!
//! Noise is drawn from a per-sensor [`NoiseSource`]. A disabled source returns exactly zero, so
//! readings become a deterministic function of the truth state.
use crate::config::{GpsNoiseConfig, HomeConfig, ImuNoiseConfig};
use crate::earth::{self, KELVIN_OFFSET};
use crate::{GRAVITY, wrap_to_2pi};

use log::{debug, trace};
use nalgebra::{Matrix3, Vector3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

/// Zero-mean Gaussian noise generator with a runtime on/off switch.
///
/// The enabled variant owns a seeded [`StdRng`], so two sources built from the same seed
/// produce identical sequences.
///
/// ## Example
///
/// ```
/// use quadsim::sensors::NoiseSource;
///
/// let mut quiet = NoiseSource::disabled();
/// assert_eq!(quiet.sample(1.0), 0.0);
///
/// let mut a = NoiseSource::seeded(42);
/// let mut b = NoiseSource::seeded(42);
/// assert_eq!(a.sample(0.5), b.sample(0.5));
/// ```
#[derive(Clone, Debug)]
pub struct NoiseSource {
    rng: Option<StdRng>,
}
impl NoiseSource {
    /// A source that always returns zero
    pub fn disabled() -> Self {
        NoiseSource { rng: None }
    }
    /// An enabled source seeded for reproducibility
    pub fn seeded(seed: u64) -> Self {
        NoiseSource {
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }
    /// Enabled or disabled source depending on `enabled`
    pub fn new(enabled: bool, seed: u64) -> Self {
        if enabled {
            Self::seeded(seed)
        } else {
            Self::disabled()
        }
    }
    /// Whether samples are drawn at all
    pub fn is_enabled(&self) -> bool {
        self.rng.is_some()
    }
    /// Draw one zero-mean sample with the given standard deviation.
    ///
    /// Returns `0.0` when the source is disabled or `std_dev` is negative or not finite.
    pub fn sample(&mut self, std_dev: f64) -> f64 {
        let Some(rng) = self.rng.as_mut() else {
            return 0.0;
        };
        if !(std_dev.is_finite() && std_dev >= 0.0) {
            return 0.0;
        }
        match Normal::new(0.0, std_dev) {
            Ok(normal) => normal.sample(rng),
            Err(_) => 0.0,
        }
    }
    /// Three independent samples, one per axis
    pub fn sample_vector(&mut self, std_dev: f64) -> Vector3<f64> {
        let x = self.sample(std_dev);
        let y = self.sample(std_dev);
        let z = self.sample(std_dev);
        Vector3::new(x, y, z)
    }
}

/// A single GPS fix.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GpsReading {
    /// WGS84 latitude in degrees
    pub latitude: f64,
    /// WGS84 longitude in degrees
    pub longitude: f64,
    /// WGS84 altitude in meters
    pub altitude: f64,
    /// North, east, down velocity in m/s
    pub velocity: Vector3<f64>,
    /// Horizontal speed in m/s
    pub ground_speed: f64,
    /// Course over ground in degrees, [0, 360)
    pub course_over_ground: f64,
}

/// Simulated GPS receiver
#[derive(Clone, Debug)]
pub struct GpsSensor {
    config: GpsNoiseConfig,
    home: HomeConfig,
    reading: GpsReading,
    noise: NoiseSource,
}
impl GpsSensor {
    /// Create a receiver reporting the home position at rest.
    pub fn new(config: &GpsNoiseConfig, home: &HomeConfig, noise: NoiseSource) -> Self {
        let reading = GpsReading {
            latitude: home.latitude,
            longitude: home.longitude,
            altitude: home.altitude,
            ..GpsReading::default()
        };
        debug!("GPS initialised at {:?}", reading);
        GpsSensor {
            config: *config,
            home: *home,
            reading,
            noise,
        }
    }
    /// Produce a fix from the true NED position and velocity relative to home.
    pub fn update(&mut self, position_ned: &Vector3<f64>, velocity_ned: &Vector3<f64>) {
        let (latitude, longitude, altitude) = earth::ned_to_lla(
            position_ned,
            self.home.latitude,
            self.home.longitude,
            self.home.altitude,
        );
        let cfg = &self.config;
        let latitude = latitude + self.noise.sample(cfg.lat_lon_noise_std_dev);
        let longitude = longitude + self.noise.sample(cfg.lat_lon_noise_std_dev);
        let altitude = altitude + self.noise.sample(cfg.alt_noise_std_dev);
        let velocity = velocity_ned + self.noise.sample_vector(cfg.speed_noise_std_dev);

        self.reading = GpsReading {
            latitude,
            longitude,
            altitude,
            velocity,
            ground_speed: velocity[0].hypot(velocity[1]),
            course_over_ground: course_over_ground(&velocity),
        };
        trace!("GPS update: {:?}", self.reading);
    }
    /// Latest fix
    pub fn reading(&self) -> &GpsReading {
        &self.reading
    }
    /// Advertised horizontal accuracy in meters
    pub fn eph(&self) -> f64 {
        self.config.eph
    }
    /// Advertised vertical accuracy in meters
    pub fn epv(&self) -> f64 {
        self.config.epv
    }
    /// Reported fix type (3 for a 3D fix)
    pub fn fix_type(&self) -> u8 {
        self.config.fix_type
    }
    /// Number of satellites reported in view
    pub fn visible_satellites(&self) -> u8 {
        self.config.visible_satellites
    }
}

/// Course over ground in degrees, measured clockwise from north in [0, 360)
fn course_over_ground(velocity_ned: &Vector3<f64>) -> f64 {
    let course = wrap_to_2pi(velocity_ned[1].atan2(velocity_ned[0])).to_degrees();
    if course >= 360.0 { 0.0 } else { course }
}

/// A single IMU sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ImuReading {
    /// Specific force in m/s^2, body frame
    pub accel: Vector3<f64>,
    /// Angular rate in rad/s, body frame
    pub gyro: Vector3<f64>,
}

/// Simulated strapdown IMU
#[derive(Clone, Debug)]
pub struct ImuSensor {
    config: ImuNoiseConfig,
    reading: ImuReading,
    noise: NoiseSource,
}
impl ImuSensor {
    /// Create an IMU at rest and level: the accelerometer reads `-g` on the z axis.
    pub fn new(config: &ImuNoiseConfig, noise: NoiseSource) -> Self {
        let reading = ImuReading {
            accel: Vector3::new(0.0, 0.0, -GRAVITY),
            gyro: Vector3::zeros(),
        };
        debug!("IMU initialised at {:?}", reading);
        ImuSensor {
            config: *config,
            reading,
            noise,
        }
    }
    /// Produce a sample from the true body-frame kinematics.
    ///
    /// # Parameters
    /// - `accel_body` - kinematic acceleration in the body frame, m/s^2 (gravity excluded)
    /// - `omega_body` - angular rate in the body frame, rad/s
    /// - `dcm` - Earth-to-body direction cosine matrix
    pub fn update(&mut self, accel_body: &Vector3<f64>, omega_body: &Vector3<f64>, dcm: &Matrix3<f64>) {
        // Gravity projected into the body frame: third column of the DCM
        let gravity_body: Vector3<f64> = dcm.column(2) * -GRAVITY;
        let accel = accel_body
            + gravity_body
            + self.noise.sample_vector(self.config.accel_noise_std_dev);
        let gyro = omega_body + self.noise.sample_vector(self.config.gyro_noise_std_dev);
        self.reading = ImuReading { accel, gyro };
        trace!("IMU update: {:?}", self.reading);
    }
    /// Latest IMU sample
    pub fn reading(&self) -> &ImuReading {
        &self.reading
    }
}

/// Simulated three-axis magnetometer
///
/// ## Example
///
/// ```
/// use quadsim::config::HomeConfig;
/// use quadsim::earth;
/// use quadsim::sensors::{MagSensor, NoiseSource};
///
/// let home = HomeConfig::default();
/// let mut mag = MagSensor::new(0.005, &home, NoiseSource::disabled());
/// let initial = mag.mag_field();
/// mag.update(home.latitude, home.longitude, &earth::dcm_from_yaw(home.yaw));
/// assert_eq!(mag.mag_field(), initial);
/// ```
#[derive(Clone, Debug)]
pub struct MagSensor {
    noise_std_dev: f64,
    mag_field: Vector3<f64>,
    noise: NoiseSource,
}
impl MagSensor {
    /// Create a magnetometer reading the field at home, level, at the home heading.
    ///
    /// The initial reading is noise free.
    pub fn new(noise_std_dev: f64, home: &HomeConfig, noise: NoiseSource) -> Self {
        let dcm = earth::dcm_from_yaw(home.yaw);
        let mag_field = earth::compute_body_field(home.latitude, home.longitude, &dcm);
        debug!("Magnetometer initialised at {:?}", mag_field);
        MagSensor {
            noise_std_dev,
            mag_field,
            noise,
        }
    }
    /// Recompute the body-frame field at a geodetic position and attitude, then add noise.
    ///
    /// Positions outside the geodetic range give a zero field plus noise.
    pub fn update(&mut self, latitude: f64, longitude: f64, dcm: &Matrix3<f64>) {
        let field = earth::compute_body_field(latitude, longitude, dcm);
        self.mag_field = field + self.noise.sample_vector(self.noise_std_dev);
        trace!("Magnetometer update: {:?}", self.mag_field);
    }
    /// Latest body-frame field in Gauss
    pub fn mag_field(&self) -> Vector3<f64> {
        self.mag_field
    }
    /// Per-axis noise standard deviation in Gauss
    pub fn noise_std_dev(&self) -> f64 {
        self.noise_std_dev
    }
}

/// A single barometer sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BaroReading {
    /// Static pressure in hPa
    pub pressure: f64,
    /// Altitude implied by the measured pressure in meters
    pub pressure_altitude: f64,
    /// Dynamic pressure along the body x axis in hPa
    pub differential_pressure: f64,
    /// Static air temperature in degrees Celsius
    pub temperature: f64,
}
impl BaroReading {
    /// Reading at an altitude and forward airspeed with a pressure error of `noise` pascals
    fn from_atmosphere(altitude: f64, vel_body_x: f64, noise: f64) -> Self {
        let atmosphere = earth::isa_atmosphere(altitude);
        BaroReading {
            pressure: 0.01 * (atmosphere.pressure + noise),
            pressure_altitude: altitude - noise / (GRAVITY * atmosphere.density),
            differential_pressure: 0.005 * atmosphere.density * vel_body_x.powi(2),
            temperature: atmosphere.temperature - KELVIN_OFFSET,
        }
    }
}

/// Simulated barometer and pitot pair
#[derive(Clone, Debug)]
pub struct BaroSensor {
    noise_std_dev: f64,
    reading: BaroReading,
    noise: NoiseSource,
}
impl BaroSensor {
    /// Create a barometer reading the noise-free atmosphere at the home altitude, at rest.
    pub fn new(noise_std_dev: f64, home: &HomeConfig, noise: NoiseSource) -> Self {
        let reading = BaroReading::from_atmosphere(home.altitude, 0.0, 0.0);
        debug!("Barometer initialised at {:?}", reading);
        BaroSensor {
            noise_std_dev,
            reading,
            noise,
        }
    }
    /// Produce a sample from the true altitude and forward body velocity.
    ///
    /// A single pressure error is drawn per tick and propagated consistently into the
    /// pressure altitude.
    pub fn update(&mut self, altitude: f64, vel_body_x: f64) {
        let noise = self.noise.sample(self.noise_std_dev);
        self.reading = BaroReading::from_atmosphere(altitude, vel_body_x, noise);
        trace!("Barometer update: {:?}", self.reading);
    }
    /// Latest barometer sample
    pub fn reading(&self) -> &BaroReading {
        &self.reading
    }
}
