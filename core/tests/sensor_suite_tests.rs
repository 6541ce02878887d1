//! End-to-end tests of the public API: field model properties, sensor lifecycle, configuration
//! files and CSV export.
use assert_approx_eq::assert_approx_eq;
use nalgebra::Matrix3;

use quadsim::config::{HomeConfig, SimulationConfig};
use quadsim::earth;
use quadsim::geomag::{self, DECLINATION, INCLINATION, STRENGTH};
use quadsim::sensors::{MagSensor, NoiseSource};
use quadsim::sim::{self, SensorRecord, SensorSuite, VehicleState};

#[test]
fn declination_at_null_island_is_table_cell() {
    assert_eq!(geomag::interpolate(0.0, 0.0, &DECLINATION), -5.0);
    assert_eq!(geomag::interpolate(0.0, 0.0, &INCLINATION), -30.0);
    assert_eq!(geomag::interpolate(0.0, 0.0, &STRENGTH), 32.0);
}

#[test]
fn out_of_range_queries_are_exactly_zero() {
    for (lat, lon) in [(90.5, 0.0), (-91.0, 10.0), (0.0, 180.5), (0.0, -181.0)] {
        for grid in [&DECLINATION, &INCLINATION, &STRENGTH] {
            assert_eq!(geomag::interpolate(lat, lon, grid), 0.0);
        }
    }
    assert_eq!(earth::earth_magnetic_field(95.0, 0.0), nalgebra::Vector3::zeros());
}

#[test]
fn interpolation_stays_within_cell_corners() {
    // Positive quadrant so that truncation and floor bucketing agree
    let mut lat: f64 = 0.5;
    while lat < 60.0 {
        let mut lon: f64 = 0.5;
        while lon < 180.0 {
            let row = (lat / 10.0).trunc() as usize + 6;
            let col = (lon / 10.0).trunc() as usize + 18;
            for grid in [&DECLINATION, &INCLINATION, &STRENGTH] {
                let corners = [
                    grid.sample(row, col),
                    grid.sample(row, col + 1),
                    grid.sample(row + 1, col),
                    grid.sample(row + 1, col + 1),
                ]
                .map(|c| c.unwrap_or(f64::NAN));
                let lo = corners.iter().cloned().fold(f64::INFINITY, f64::min);
                let hi = corners.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let value = geomag::interpolate(lat, lon, grid);
                assert!(value >= lo - 1e-9 && value <= hi + 1e-9, "{lat}, {lon}: {value}");
            }
            lon += 7.3;
        }
        lat += 4.1;
    }
}

#[test]
fn high_latitudes_read_the_edge_rows() {
    for lon in [-170.0, -20.0, 0.0, 35.0, 150.0] {
        for grid in [&DECLINATION, &INCLINATION, &STRENGTH] {
            assert_eq!(
                geomag::interpolate(75.0, lon, grid),
                geomag::interpolate(60.0, lon, grid)
            );
            assert_eq!(
                geomag::interpolate(-85.0, lon, grid),
                geomag::interpolate(-60.0, lon, grid)
            );
        }
    }
}

#[test]
fn magnetometer_init_matches_body_field_at_home() {
    let home = HomeConfig {
        yaw: 1.1,
        ..HomeConfig::default()
    };
    let mag = MagSensor::new(0.005, &home, NoiseSource::seeded(5));
    let dcm = earth::dcm_from_yaw(1.1);
    let expected = earth::compute_body_field(home.latitude, home.longitude, &dcm);
    assert_eq!(mag.mag_field(), expected);
    // Horizontal rotation preserves the field magnitude
    let earth_field = earth::earth_magnetic_field(home.latitude, home.longitude);
    assert_approx_eq!(mag.mag_field().norm(), earth_field.norm(), 1e-12);
}

#[test]
fn disabled_noise_gives_bit_identical_runs() {
    let config = SimulationConfig::default();
    let states = sim::circle_trajectory(8.0, 3.0, 4.0, 0.05, 3.0);
    let a = sim::run_trajectory(&config, states.clone());
    let b = sim::run_trajectory(&config, states);
    assert_eq!(a, b);
    for record in &a {
        assert_eq!(record.gps_fix_type, 3);
        assert_eq!(record.gps_satellites, 10);
    }
}

#[test]
fn magnetometer_noise_matches_configured_std_dev() {
    let config = SimulationConfig {
        noise_enabled: true,
        mag_noise_std_dev: 0.01,
        ..SimulationConfig::default()
    };
    let home = config.home;
    let mut suite = SensorSuite::new(&config);
    let state = VehicleState::default();
    let (lat, lon, _) = earth::ned_to_lla(
        &state.position_ned,
        home.latitude,
        home.longitude,
        home.altitude,
    );
    let truth = earth::compute_body_field(lat, lon, &Matrix3::identity());
    let n = 10_000;
    let mut sum_sq = [0.0; 3];
    for _ in 0..n {
        suite.update(&state);
        let error = suite.mag().mag_field() - truth;
        for axis in 0..3 {
            sum_sq[axis] += error[axis].powi(2);
        }
    }
    for total in sum_sq {
        assert_approx_eq!((total / n as f64).sqrt(), 0.01, 5e-4);
    }
}

#[test]
fn config_file_drives_the_suite() {
    let config = SimulationConfig {
        noise_enabled: false,
        home: HomeConfig {
            latitude: -33.9,
            longitude: 151.2,
            altitude: 20.0,
            yaw: 0.0,
        },
        ..SimulationConfig::default()
    };
    let file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("Failed to create temp file");
    config.to_file(file.path()).expect("Failed to write config");
    let loaded = SimulationConfig::load(file.path()).expect("Failed to load config");
    assert_eq!(loaded, config);

    let suite = SensorSuite::new(&loaded);
    let expected = earth::compute_body_field(-33.9, 151.2, &Matrix3::identity());
    assert_eq!(suite.mag().mag_field(), expected);
    assert_eq!(suite.gps().reading().latitude, -33.9);
}

#[test]
fn circle_run_exports_to_csv() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("sensors.csv");
    let states = sim::circle_trajectory(10.0, 2.0, 5.0, 0.1, 10.0);
    let records = sim::run_trajectory(&SimulationConfig::default(), states);
    assert_eq!(records.len(), 101);
    SensorRecord::to_csv(&records, &path).expect("Failed to write CSV");

    let loaded = SensorRecord::from_csv(&path).expect("Failed to read CSV");
    assert_eq!(loaded.len(), records.len());
    for record in &loaded {
        assert_approx_eq!(record.gps_ground_speed, 2.0, 1e-9);
        assert_approx_eq!(record.gps_altitude, 493.0, 1e-2);
        assert!(record.gps_course >= 0.0 && record.gps_course < 360.0);
        // Level flight: gravity stays on the body z axis
        assert_approx_eq!(record.acc_z, -quadsim::GRAVITY, 1e-9);
        assert_approx_eq!(record.acc_y, 0.4, 1e-9);
        assert_approx_eq!(record.baro_pressure_altitude, 493.0, 1e-9);
    }
    let header = std::fs::read_to_string(&path).expect("Failed to read CSV text");
    assert!(header.starts_with("time,gps_latitude,gps_longitude"));
}
