//! Simulation configuration
//!
//! [`SimulationConfig`] collects everything the sensor models need besides the per-tick truth
//! state: the home position the local NED frame is anchored to, the noise switch and seed, and
//! the noise characteristics of each sensor. Defaults describe a small quadrotor with
//! consumer-grade sensors flying from Zürich.
//!
//! Configurations can be written to and read from JSON, YAML or TOML. Every field is optional
//! on read and falls back to its default, so a file only needs to list what it changes:
//!
//! ```toml
//! noise_enabled = true
//! seed = 7
//! mag_noise_std_dev = 0.01
//!
//! [home]
//! latitude = 40.0
//! longitude = -105.0
//! ```
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Default home latitude in degrees
pub const HOME_LATITUDE: f64 = 47.397742;
/// Default home longitude in degrees
pub const HOME_LONGITUDE: f64 = 8.545594;
/// Default home altitude in meters
pub const HOME_ALTITUDE: f64 = 488.0;
/// Default home heading in radians
pub const HOME_YAW: f64 = 0.0;

/// Errors raised while loading or validating a [`SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Noise standard deviation `{name}` must be finite and non-negative, found `{value}`")]
    InvalidNoise { name: &'static str, value: f64 },

    #[error("Home latitude must be within [-90, 90] degrees, found `{0}`")]
    InvalidLatitude(f64),

    #[error("Home longitude must be within [-180, 180] degrees, found `{0}`")]
    InvalidLongitude(f64),

    #[error("Home {name} must be finite, found `{value}`")]
    NonFiniteHome { name: &'static str, value: f64 },

    #[error("Could not read the configuration file: {0}")]
    Io(#[from] io::Error),
}

/// Home position of the simulation; the origin of the local NED frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeConfig {
    /// WGS84 latitude in degrees
    pub latitude: f64,
    /// WGS84 longitude in degrees
    pub longitude: f64,
    /// WGS84 altitude in meters
    pub altitude: f64,
    /// Initial heading in radians (roll and pitch start at zero)
    pub yaw: f64,
}
impl Default for HomeConfig {
    fn default() -> Self {
        HomeConfig {
            latitude: HOME_LATITUDE,
            longitude: HOME_LONGITUDE,
            altitude: HOME_ALTITUDE,
            yaw: HOME_YAW,
        }
    }
}

/// GPS receiver characteristics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpsNoiseConfig {
    /// Advertised horizontal position accuracy in meters
    pub eph: f64,
    /// Advertised vertical position accuracy in meters
    pub epv: f64,
    /// Fix type reported by the receiver (3 = 3D fix)
    pub fix_type: u8,
    /// Number of satellites reported as visible
    pub visible_satellites: u8,
    /// Latitude and longitude noise in degrees
    pub lat_lon_noise_std_dev: f64,
    /// Altitude noise in meters
    pub alt_noise_std_dev: f64,
    /// Velocity noise in m/s
    pub speed_noise_std_dev: f64,
}
impl Default for GpsNoiseConfig {
    fn default() -> Self {
        GpsNoiseConfig {
            eph: 1.0,
            epv: 1.0,
            fix_type: 3,
            visible_satellites: 10,
            lat_lon_noise_std_dev: 1e-6,
            alt_noise_std_dev: 0.01,
            speed_noise_std_dev: 0.01,
        }
    }
}

/// IMU white-noise characteristics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImuNoiseConfig {
    /// Accelerometer noise in m/s^2
    pub accel_noise_std_dev: f64,
    /// Gyroscope noise in rad/s
    pub gyro_noise_std_dev: f64,
}
impl Default for ImuNoiseConfig {
    fn default() -> Self {
        ImuNoiseConfig {
            accel_noise_std_dev: 0.05,
            gyro_noise_std_dev: 0.01,
        }
    }
}

/// Default random seed for reproducible simulations
fn default_seed() -> u64 {
    42
}
fn default_mag_noise() -> f64 {
    0.005
}
fn default_baro_noise() -> f64 {
    0.01
}

/// Configuration container for the simulated sensor suite.
///
/// ## Example
///
/// ```
/// use quadsim::config::SimulationConfig;
///
/// let cfg = SimulationConfig {
///     noise_enabled: true,
///     seed: 7,
///     ..SimulationConfig::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Add Gaussian noise to the sensor readings.
    ///
    /// When disabled every reading is a deterministic function of the truth state.
    #[serde(default)]
    pub noise_enabled: bool,

    /// Random number generator seed for deterministic tests and reproducibility.
    ///
    /// Each sensor draws from its own stream derived from this seed.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Magnetometer noise in Gauss
    #[serde(default = "default_mag_noise")]
    pub mag_noise_std_dev: f64,

    /// Barometer noise in pascals
    #[serde(default = "default_baro_noise")]
    pub baro_noise_std_dev: f64,

    /// Origin of the local NED frame and the initial heading.
    #[serde(default)]
    pub home: HomeConfig,

    #[serde(default)]
    pub gps: GpsNoiseConfig,

    #[serde(default)]
    pub imu: ImuNoiseConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            home: HomeConfig::default(),
            noise_enabled: false,
            seed: default_seed(),
            gps: GpsNoiseConfig::default(),
            imu: ImuNoiseConfig::default(),
            mag_noise_std_dev: default_mag_noise(),
            baro_noise_std_dev: default_baro_noise(),
        }
    }
}

impl SimulationConfig {
    /// Check that the configuration describes a physically meaningful setup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let home = &self.home;
        for (name, value) in [("altitude", home.altitude), ("yaw", home.yaw)] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteHome { name, value });
            }
        }
        if !(-90.0..=90.0).contains(&home.latitude) {
            return Err(ConfigError::InvalidLatitude(home.latitude));
        }
        if !(-180.0..=180.0).contains(&home.longitude) {
            return Err(ConfigError::InvalidLongitude(home.longitude));
        }
        let noise = [
            ("gps.eph", self.gps.eph),
            ("gps.epv", self.gps.epv),
            ("gps.lat_lon_noise_std_dev", self.gps.lat_lon_noise_std_dev),
            ("gps.alt_noise_std_dev", self.gps.alt_noise_std_dev),
            ("gps.speed_noise_std_dev", self.gps.speed_noise_std_dev),
            ("imu.accel_noise_std_dev", self.imu.accel_noise_std_dev),
            ("imu.gyro_noise_std_dev", self.imu.gyro_noise_std_dev),
            ("mag_noise_std_dev", self.mag_noise_std_dev),
            ("baro_noise_std_dev", self.baro_noise_std_dev),
        ];
        for (name, value) in noise {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidNoise { name, value });
            }
        }
        if home.latitude.abs() > 60.0 {
            warn!(
                "Home latitude {} is outside the geomagnetic survey coverage; the magnetometer will read the edge of the table",
                home.latitude
            );
        }
        Ok(())
    }

    /// Read a configuration file (format chosen by extension) and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let cfg = Self::from_file(path)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Write the configuration to a JSON file (pretty-printed).
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self).map_err(io::Error::other)
    }

    /// Read the configuration from a JSON file.
    pub fn from_json<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(file).map_err(io::Error::other)
    }
    /// Write the configuration as YAML.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        let s = serde_yaml::to_string(self).map_err(io::Error::other)?;
        file.write_all(s.as_bytes())
    }

    /// Read the configuration from YAML.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        serde_yaml::from_reader(file).map_err(io::Error::other)
    }
    /// Write the configuration as TOML.
    pub fn to_toml<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        let s = toml::to_string(self).map_err(io::Error::other)?;
        file.write_all(s.as_bytes())
    }
    /// Read the configuration from TOML.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut s = String::new();
        let mut file = File::open(path)?;
        file.read_to_string(&mut s)?;
        toml::from_str(&s).map_err(io::Error::other)
    }
    /// Generic write: choose format by file extension (.json/.yaml/.yml/.toml)
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let p = path.as_ref();
        match extension(p).as_deref() {
            Some("json") => self.to_json(p),
            Some("yaml") | Some("yml") => self.to_yaml(p),
            Some("toml") => self.to_toml(p),
            _ => Err(unsupported_extension(p)),
        }
    }
    /// Generic read: choose format by file extension (.json/.yaml/.yml/.toml)
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let p = path.as_ref();
        match extension(p).as_deref() {
            Some("json") => Self::from_json(p),
            Some("yaml") | Some("yml") => Self::from_yaml(p),
            Some("toml") => Self::from_toml(p),
            _ => Err(unsupported_extension(p)),
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
}

fn unsupported_extension(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("unsupported configuration file extension: {}", path.display()),
    )
}
