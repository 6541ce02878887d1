//! Sensor suite simulation and CSV export
//!
//! This module provides:
//! - [`VehicleState`], the true state of the vehicle at one instant
//! - [`SensorSuite`], which owns one of each sensor and updates them together
//! - [`SensorRecord`], a flat row of every reading for CSV import/export
//! - [`circle_trajectory`] and [`run_trajectory`] for generating a full data set in one call
use crate::config::SimulationConfig;
use crate::earth;
use crate::sensors::{BaroSensor, GpsSensor, ImuSensor, MagSensor, NoiseSource};
use crate::wrap_to_2pi;

use log::{debug, trace};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// True kinematic state of the vehicle.
///
/// Position and velocity are in the local NED frame anchored at the home position. The
/// acceleration and angular rate are kinematic (gravity excluded) and expressed in the body frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VehicleState {
    /// Position relative to home, meters (NED)
    pub position_ned: Vector3<f64>,
    /// Velocity, m/s (NED)
    pub velocity_ned: Vector3<f64>,
    /// Kinematic acceleration, m/s^2 (body)
    pub accel_body: Vector3<f64>,
    /// Angular rate, rad/s (body)
    pub omega_body: Vector3<f64>,
    /// Roll angle, radians
    pub roll: f64,
    /// Pitch angle, radians
    pub pitch: f64,
    /// Yaw angle, radians
    pub yaw: f64,
}
impl VehicleState {
    /// Earth-to-body direction cosine matrix for the current attitude
    pub fn dcm(&self) -> Matrix3<f64> {
        earth::dcm_from_euler(self.roll, self.pitch, self.yaw)
    }
}

/// One of each simulated sensor, configured from a single [`SimulationConfig`].
#[derive(Clone, Debug)]
pub struct SensorSuite {
    config: SimulationConfig,
    gps: GpsSensor,
    imu: ImuSensor,
    mag: MagSensor,
    baro: BaroSensor,
}
impl SensorSuite {
    /// Build and initialise all sensors at the configured home position.
    ///
    /// With noise enabled, each sensor draws from an independent stream: the GPS is seeded with
    /// `seed`, the IMU with `seed + 1`, the magnetometer with `seed + 2` and the barometer with
    /// `seed + 3`.
    pub fn new(config: &SimulationConfig) -> Self {
        let noise =
            |offset: u64| NoiseSource::new(config.noise_enabled, config.seed.wrapping_add(offset));
        let suite = SensorSuite {
            config: config.clone(),
            gps: GpsSensor::new(&config.gps, &config.home, noise(0)),
            imu: ImuSensor::new(&config.imu, noise(1)),
            mag: MagSensor::new(config.mag_noise_std_dev, &config.home, noise(2)),
            baro: BaroSensor::new(config.baro_noise_std_dev, &config.home, noise(3)),
        };
        debug!(
            "Sensor suite initialised at home {:?} (noise enabled: {})",
            config.home, config.noise_enabled
        );
        suite
    }
    /// Update every sensor from the true vehicle state.
    pub fn update(&mut self, state: &VehicleState) {
        let home = &self.config.home;
        let dcm = state.dcm();
        self.gps.update(&state.position_ned, &state.velocity_ned);
        self.imu.update(&state.accel_body, &state.omega_body, &dcm);

        let (latitude, longitude, _) =
            earth::ned_to_lla(&state.position_ned, home.latitude, home.longitude, home.altitude);
        self.mag.update(latitude, longitude, &dcm);

        let altitude = home.altitude - state.position_ned[2];
        let velocity_body = earth::earth_to_body_rotation(&dcm, &state.velocity_ned);
        self.baro.update(altitude, velocity_body[0]);
        trace!("Sensor suite updated from {:?}", state);
    }
    /// Configuration the suite was built from
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
    /// GPS receiver
    pub fn gps(&self) -> &GpsSensor {
        &self.gps
    }
    /// Inertial measurement unit
    pub fn imu(&self) -> &ImuSensor {
        &self.imu
    }
    /// Magnetometer
    pub fn mag(&self) -> &MagSensor {
        &self.mag
    }
    /// Barometer
    pub fn baro(&self) -> &BaroSensor {
        &self.baro
    }
    /// Snapshot the latest readings as a flat record stamped with `time`.
    pub fn record(&self, time: f64) -> SensorRecord {
        let gps = self.gps.reading();
        let imu = self.imu.reading();
        let mag = self.mag.mag_field();
        let baro = self.baro.reading();
        SensorRecord {
            time,
            gps_latitude: gps.latitude,
            gps_longitude: gps.longitude,
            gps_altitude: gps.altitude,
            gps_vel_n: gps.velocity[0],
            gps_vel_e: gps.velocity[1],
            gps_vel_d: gps.velocity[2],
            gps_ground_speed: gps.ground_speed,
            gps_course: gps.course_over_ground,
            gps_eph: self.gps.eph(),
            gps_epv: self.gps.epv(),
            gps_fix_type: self.gps.fix_type(),
            gps_satellites: self.gps.visible_satellites(),
            acc_x: imu.accel[0],
            acc_y: imu.accel[1],
            acc_z: imu.accel[2],
            gyro_x: imu.gyro[0],
            gyro_y: imu.gyro[1],
            gyro_z: imu.gyro[2],
            mag_x: mag[0],
            mag_y: mag[1],
            mag_z: mag[2],
            baro_pressure: baro.pressure,
            baro_pressure_altitude: baro.pressure_altitude,
            baro_differential_pressure: baro.differential_pressure,
            baro_temperature: baro.temperature,
        }
    }
}

/// Every sensor reading at one instant, one CSV row.
///
/// Units follow the sensors: degrees and meters for GPS position, m/s for velocity, m/s^2 and
/// rad/s for the IMU, Gauss for the magnetometer, hPa and degrees Celsius for the barometer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    /// Simulation time in seconds
    pub time: f64,
    pub gps_latitude: f64,
    pub gps_longitude: f64,
    pub gps_altitude: f64,
    pub gps_vel_n: f64,
    pub gps_vel_e: f64,
    pub gps_vel_d: f64,
    pub gps_ground_speed: f64,
    /// Course over ground in degrees
    pub gps_course: f64,
    pub gps_eph: f64,
    pub gps_epv: f64,
    pub gps_fix_type: u8,
    pub gps_satellites: u8,
    pub acc_x: f64,
    pub acc_y: f64,
    pub acc_z: f64,
    pub gyro_x: f64,
    pub gyro_y: f64,
    pub gyro_z: f64,
    pub mag_x: f64,
    pub mag_y: f64,
    pub mag_z: f64,
    pub baro_pressure: f64,
    pub baro_pressure_altitude: f64,
    pub baro_differential_pressure: f64,
    pub baro_temperature: f64,
}
impl SensorRecord {
    /// Reads a CSV file of sensor records.
    ///
    /// # Arguments
    /// * `path` - Path to a CSV file written by [`SensorRecord::to_csv`].
    ///
    /// # Returns
    /// * `Ok(Vec<SensorRecord>)` if successful.
    /// * `Err` if the file cannot be read or parsed.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Self>, Box<dyn std::error::Error>> {
        let mut rdr = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let record: Self = result?;
            records.push(record);
        }
        Ok(records)
    }
    /// Writes sensor records to a CSV file with a header row.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use quadsim::config::SimulationConfig;
    /// use quadsim::sim::{self, SensorRecord};
    ///
    /// let states = sim::circle_trajectory(10.0, 2.0, 5.0, 0.01, 60.0);
    /// let records = sim::run_trajectory(&SimulationConfig::default(), states);
    /// SensorRecord::to_csv(&records, "sensors.csv").expect("Failed to write CSV");
    /// ```
    pub fn to_csv<P: AsRef<Path>>(records: &[Self], path: P) -> io::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Largest number of samples a generated trajectory may hold
pub const MAX_TRAJECTORY_STEPS: usize = 10_000_000;

/// Number of sample periods in a run, so a trajectory holds `steps + 1` samples.
///
/// Returns `None` if `dt` is not positive, `duration` is negative, either is not finite, or the
/// run would exceed [`MAX_TRAJECTORY_STEPS`].
///
/// # Example
/// ```rust
/// use quadsim::sim;
/// assert_eq!(sim::trajectory_steps(0.01, 60.0), Some(6000));
/// assert_eq!(sim::trajectory_steps(1e-9, 1e12), None);
/// ```
pub fn trajectory_steps(dt: f64, duration: f64) -> Option<usize> {
    if !(dt.is_finite() && dt > 0.0 && duration.is_finite() && duration >= 0.0) {
        return None;
    }
    let steps = (duration / dt + 1e-9).floor();
    if steps >= MAX_TRAJECTORY_STEPS as f64 {
        return None;
    }
    Some(steps as usize)
}

/// Timestamped truth states for a horizontal circle flown at constant speed and altitude.
///
/// The circle is centred on home and starts due north of it, flying clockwise seen from above
/// with the nose along the velocity. The angular rate is $\omega = v / r$, the centripetal
/// acceleration $v^2 / r$ appears on the body y axis and the yaw rate $\omega$ on the body z
/// axis. A non-positive radius or a zero speed gives a level hover above home.
///
/// # Parameters
/// - `radius` - Circle radius in meters
/// - `speed` - Ground speed in m/s
/// - `altitude` - Height above home in meters
/// - `dt` - Sample period in seconds
/// - `duration` - Length of the run in seconds; samples are taken at `0, dt, 2 dt, ...` up to `duration`
///
/// # Returns
/// Pairs of `(time, state)`. Empty whenever [`trajectory_steps`] rejects `dt` and `duration`.
pub fn circle_trajectory(
    radius: f64,
    speed: f64,
    altitude: f64,
    dt: f64,
    duration: f64,
) -> Vec<(f64, VehicleState)> {
    let Some(steps) = trajectory_steps(dt, duration) else {
        return Vec::new();
    };
    let hover = !(radius.is_finite() && radius > 0.0 && speed.is_finite() && speed != 0.0);
    (0..=steps)
        .map(|k| {
            let time = k as f64 * dt;
            let state = if hover {
                VehicleState {
                    position_ned: Vector3::new(0.0, 0.0, -altitude),
                    ..VehicleState::default()
                }
            } else {
                let rate = speed / radius;
                let (sin, cos) = (rate * time).sin_cos();
                let velocity_ned = Vector3::new(-speed * sin, speed * cos, 0.0);
                VehicleState {
                    position_ned: Vector3::new(radius * cos, radius * sin, -altitude),
                    velocity_ned,
                    accel_body: Vector3::new(0.0, speed * rate, 0.0),
                    omega_body: Vector3::new(0.0, 0.0, rate),
                    roll: 0.0,
                    pitch: 0.0,
                    yaw: wrap_to_2pi(velocity_ned[1].atan2(velocity_ned[0])),
                }
            };
            (time, state)
        })
        .collect()
}

/// Drive a fresh [`SensorSuite`] through a sequence of timestamped truth states.
///
/// Returns one record per state, in order.
pub fn run_trajectory<I>(config: &SimulationConfig, states: I) -> Vec<SensorRecord>
where
    I: IntoIterator<Item = (f64, VehicleState)>,
{
    let mut suite = SensorSuite::new(config);
    let records: Vec<SensorRecord> = states
        .into_iter()
        .map(|(time, state)| {
            suite.update(&state);
            suite.record(time)
        })
        .collect();
    debug!("Simulated {} sensor records", records.len());
    records
}
