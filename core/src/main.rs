use clap::{Parser, ValueEnum};
use log::{LevelFilter, info};
use std::error::Error;
use std::path::PathBuf;

use quadsim::config::SimulationConfig;
use quadsim::sim::{self, SensorRecord};

const LONG_ABOUT: &str = "QUADSIM: Sensor data generator for a simulated quadrotor.

Flies a horizontal circle about the home position at constant speed and altitude, with the nose along the velocity, and records what the onboard GPS, IMU, magnetometer and barometer would report at every tick. The readings are written to a CSV file with one row per tick and a header row.

Home position, sensor noise levels and the RNG seed come from an optional configuration file (JSON, YAML or TOML, chosen by extension). Without a file the built-in defaults are used. Noise is off unless enabled in the file or forced with --noise.";

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = LONG_ABOUT)]
struct Cli {
    /// Simulation configuration file (.json, .yaml, .yml or .toml)
    #[arg(short, long, value_parser)]
    config: Option<PathBuf>,
    /// Output CSV file path
    #[arg(short, long, value_parser)]
    output: PathBuf,
    /// Length of the run in seconds
    #[arg(long, default_value_t = 60.0)]
    duration: f64,
    /// Sample period in seconds
    #[arg(long, default_value_t = 0.01)]
    dt: f64,
    /// Circle radius in meters (zero to hover)
    #[arg(long, default_value_t = 10.0)]
    radius: f64,
    /// Ground speed in m/s
    #[arg(long, default_value_t = 2.0)]
    speed: f64,
    /// Height above home in meters
    #[arg(long, default_value_t = 5.0)]
    altitude: f64,
    /// Enable sensor noise regardless of the configuration file
    #[arg(long)]
    noise: bool,
    /// Minimum level of log messages written to stderr
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Install a stderr logger with wall clock timestamps.
fn logger_init(min_level: LevelFilter) -> Result<(), Box<dyn Error>> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            // Include the target for debug and trace output
            if record.level() > log::Level::Info {
                out.finish(format_args!(
                    "[{} {:5}] {}: {}",
                    chrono::Local::now().format("%H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    message
                ))
            } else {
                out.finish(format_args!(
                    "[{} {:5}] {}",
                    chrono::Local::now().format("%H:%M:%S%.3f"),
                    record.level(),
                    message
                ))
            }
        })
        .level(min_level)
        .chain(std::io::stderr())
        .apply()
        .map_err(|e| format!("Failed to initialise logging: {e}"))?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logger_init(cli.log_level.into())?;

    let mut config = match &cli.config {
        Some(path) => {
            let config = SimulationConfig::load(path)
                .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
            info!("Loaded configuration from {}", path.display());
            config
        }
        None => SimulationConfig::default(),
    };
    if cli.noise {
        config.noise_enabled = true;
    }
    info!(
        "Home: {:.6}, {:.6} at {:.1} m; noise {}",
        config.home.latitude,
        config.home.longitude,
        config.home.altitude,
        if config.noise_enabled { "enabled" } else { "disabled" }
    );

    if !(cli.dt.is_finite() && cli.dt > 0.0) {
        return Err(format!("Sample period must be positive, found {}", cli.dt).into());
    }
    if !(cli.duration.is_finite() && cli.duration >= 0.0) {
        return Err(format!("Duration must not be negative, found {}", cli.duration).into());
    }
    if sim::trajectory_steps(cli.dt, cli.duration).is_none() {
        return Err(format!(
            "A {} s run at {} s per sample exceeds {} samples",
            cli.duration,
            cli.dt,
            sim::MAX_TRAJECTORY_STEPS
        )
        .into());
    }

    // Ensure output directory exists
    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let states = sim::circle_trajectory(cli.radius, cli.speed, cli.altitude, cli.dt, cli.duration);
    let records = sim::run_trajectory(&config, states);
    SensorRecord::to_csv(&records, &cli.output)?;
    info!(
        "Wrote {} records ({:.2} s at {} s) to {}",
        records.len(),
        cli.duration,
        cli.dt,
        cli.output.display()
    );
    Ok(())
}
