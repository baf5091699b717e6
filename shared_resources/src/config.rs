use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::request::{PassengerRequest, RequestError};
use crate::Floor;

const CONFIG_FILE_PATH: &str = "config.json";
const FALLBACK_CONFIG_FILE_PATH: &str = "_config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("invalid preset request: {0}")]
    Request(#[from] RequestError),
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ElevatorConfig {
    pub id: String,
    pub min_floor: Floor,
    pub max_floor: Floor,
    pub capacity: usize,
    /// Floor the car waits at when the run begins. Defaults to `min_floor`.
    pub start_floor: Option<Floor>,
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        ElevatorConfig {
            id: String::from("ELV-DEFAULT"),
            min_floor: 1,
            max_floor: 10,
            capacity: 5,
            start_floor: None,
        }
    }
}

impl ElevatorConfig {
    pub fn new(min_floor: Floor, max_floor: Floor, capacity: usize) -> Self {
        ElevatorConfig {
            min_floor,
            max_floor,
            capacity,
            ..Default::default()
        }
    }

    pub fn start_floor(&self) -> Floor {
        self.start_floor.unwrap_or(self.min_floor)
    }
}

/// Pacing of the worker threads, in milliseconds.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub tick_ms: u64,
    pub poll_ms: u64,
    pub grace_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            tick_ms: 500,
            poll_ms: 100,
            grace_ms: 1000,
        }
    }
}

impl TimingConfig {
    /// Interval of the movement and status-monitor loops.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Longest time the request worker blocks on the inbound channel.
    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    /// How long a stop waits for the workers before detaching them.
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub elevator: ElevatorConfig,
    pub timing: TimingConfig,
    /// Requests submitted before the run starts.
    pub requests: Vec<PassengerRequest>,
}

impl SimulationConfig {
    /// First configuration file present in the working directory, if any.
    pub fn find_config_file() -> Option<PathBuf> {
        [CONFIG_FILE_PATH, FALLBACK_CONFIG_FILE_PATH]
            .iter()
            .map(PathBuf::from)
            .find(|path| path.is_file())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let elevator = &self.elevator;
        if elevator.min_floor >= elevator.max_floor {
            return Err(ConfigError::Invalid(format!(
                "min_floor {} must be below max_floor {}",
                elevator.min_floor, elevator.max_floor
            )));
        }
        if elevator.capacity == 0 {
            return Err(ConfigError::Invalid(String::from("capacity must be at least 1")));
        }
        let start_floor = elevator.start_floor();
        if start_floor < elevator.min_floor || start_floor > elevator.max_floor {
            return Err(ConfigError::Invalid(format!(
                "start_floor {} is outside {}..={}",
                start_floor, elevator.min_floor, elevator.max_floor
            )));
        }
        let timing = &self.timing;
        if timing.tick_ms == 0 || timing.poll_ms == 0 || timing.grace_ms == 0 {
            return Err(ConfigError::Invalid(String::from(
                "tick_ms, poll_ms and grace_ms must all be positive",
            )));
        }
        for request in &self.requests {
            request.validate(elevator.min_floor, elevator.max_floor)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.elevator.start_floor(), 1);
        assert_eq!(config.timing.tick(), Duration::from_millis(500));
        assert_eq!(config.timing.poll(), Duration::from_millis(100));
        assert_eq!(config.timing.grace(), Duration::from_secs(1));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = SimulationConfig::from_json(
            r#"{ "elevator": { "max_floor": 20, "start_floor": 5 }, "requests": [[3, 7], [9, 2]] }"#,
        )
        .unwrap();
        assert_eq!(config.elevator.min_floor, 1);
        assert_eq!(config.elevator.max_floor, 20);
        assert_eq!(config.elevator.capacity, 5);
        assert_eq!(config.elevator.start_floor(), 5);
        assert_eq!(config.timing, TimingConfig::default());
        assert_eq!(
            config.requests,
            vec![PassengerRequest::new(3, 7), PassengerRequest::new(9, 2)]
        );
    }

    #[test]
    fn rejects_inverted_bounds_and_zero_capacity() {
        let inverted = SimulationConfig::from_json(r#"{ "elevator": { "min_floor": 5, "max_floor": 2 } }"#);
        assert!(matches!(inverted, Err(ConfigError::Invalid(_))));
        let empty_car = SimulationConfig::from_json(r#"{ "elevator": { "capacity": 0 } }"#);
        assert!(matches!(empty_car, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_bad_preset_requests() {
        let result = SimulationConfig::from_json(r#"{ "requests": [[4, 4]] }"#);
        assert!(matches!(result, Err(ConfigError::Request(RequestError::SameFloor(4)))));
    }

    #[test]
    fn rejects_zero_timing_and_malformed_json() {
        assert!(SimulationConfig::from_json(r#"{ "timing": { "tick_ms": 0 } }"#).is_err());
        assert!(matches!(SimulationConfig::from_json("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = SimulationConfig::load(Path::new("definitely/not/here.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
