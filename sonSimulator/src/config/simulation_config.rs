use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::constants::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Grid must have at least one row and one column (got {rows}x{cols})")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("Invalid power bounds: min={min}, max={max}")]
    InvalidPowerBounds { min: f64, max: f64 },

    #[error("Default power {power} lies outside [{min}, {max}]")]
    DefaultPowerOutOfBounds { power: f64, min: f64, max: f64 },

    #[error("{name} must be positive and finite (got {value})")]
    NonPositive { name: &'static str, value: f64 },

    #[error("Episode duration must be at least one tick")]
    ZeroEpisodeDuration,

    #[error("Observation width {width} cannot hold a station and its six neighbours")]
    ObservationTooNarrow { width: usize },

    #[error("{name} is out of range (got {value})")]
    OutOfRange { name: &'static str, value: f64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Startup configuration for one simulated network. Every value the engine
/// reads at runtime comes from here rather than from process-wide globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub window_size: f64,
    pub grid_rows: usize,
    pub grid_cols: usize,
    pub default_power: f64,
    pub min_power: f64,
    pub max_power: f64,
    pub mobile_station_count: usize,
    pub mobile_speed: f64,
    pub episode_duration: u64,
    pub power_density_threshold: f64,
    pub power_resolution: f64,
    pub observation_width: usize,
    pub tick_rate: f64,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            window_size: WINDOW_SIZE,
            grid_rows: DEFAULT_GRID_ROWS,
            grid_cols: DEFAULT_GRID_COLS,
            default_power: DEFAULT_POWER,
            min_power: MIN_POWER,
            max_power: MAX_POWER,
            mobile_station_count: DEFAULT_MOBILE_STATIONS,
            mobile_speed: DEFAULT_MOBILE_SPEED,
            episode_duration: DEFAULT_EPISODE_DURATION,
            power_density_threshold: POWER_DENSITY_THRESHOLD,
            power_resolution: POWER_RESOLUTION,
            observation_width: OBSERVATION_WIDTH,
            tick_rate: DEFAULT_TICK_RATE,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_rows == 0 || self.grid_cols == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.grid_rows,
                cols: self.grid_cols,
            });
        }

        if !self.min_power.is_finite()
            || !self.max_power.is_finite()
            || self.min_power < 0.0
            || self.min_power >= self.max_power
        {
            return Err(ConfigError::InvalidPowerBounds {
                min: self.min_power,
                max: self.max_power,
            });
        }

        if !(self.min_power..=self.max_power).contains(&self.default_power) {
            return Err(ConfigError::DefaultPowerOutOfBounds {
                power: self.default_power,
                min: self.min_power,
                max: self.max_power,
            });
        }

        for (name, value) in [
            ("window_size", self.window_size),
            ("power_density_threshold", self.power_density_threshold),
            ("power_resolution", self.power_resolution),
            ("tick_rate", self.tick_rate),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        if !self.mobile_speed.is_finite() || self.mobile_speed < 0.0 {
            return Err(ConfigError::NonPositive {
                name: "mobile_speed",
                value: self.mobile_speed,
            });
        }

        if self.episode_duration == 0 {
            return Err(ConfigError::ZeroEpisodeDuration);
        }

        if self.observation_width < OBSERVATION_WIDTH {
            return Err(ConfigError::ObservationTooNarrow {
                width: self.observation_width,
            });
        }

        Ok(())
    }

    pub fn center_point(&self) -> (f64, f64) {
        (self.window_size / 2.0, self.window_size / 2.0)
    }
}
