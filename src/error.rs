//! Error types for engine construction and sensor access.
//!
//! Nothing in here is produced on the audio path: `AudioEngine::process` never
//! fails. These errors surface at startup (invalid configuration, missing
//! sensors) or from the polling thread, which logs and carries on.

use thiserror::Error;

/// Problems found while validating an [`EngineConfig`](crate::EngineConfig).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unsupported sample rate: {0} Hz")]
    UnsupportedSampleRate(u32),

    #[error("block size {size} is outside 1..={max}")]
    InvalidBlockSize { size: usize, max: usize },

    #[error("unsupported channel count: {channels} (max {max})")]
    UnsupportedChannels { channels: usize, max: usize },

    #[error("{field} = {value} is out of range: expected {expected}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("maximum delay of {delay_samples} samples does not fit a {capacity}-sample buffer")]
    DelayExceedsBuffer {
        delay_samples: usize,
        capacity: usize,
    },
}

/// Failure reading a single distance measurement.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SensorError {
    /// No echo arrived before the sensor's timeout.
    #[error("sensor read timed out")]
    Timeout,

    #[error("sensor disconnected")]
    Disconnected,

    #[error("sensor returned an invalid reading: {0}")]
    InvalidReading(f32),

    #[error("sensor hardware error: {0}")]
    Hardware(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("sensor '{name}' is unavailable")]
    SensorUnavailable {
        name: String,
        #[source]
        source: SensorError,
    },

    #[error("sensor '{name}' only reaches {sensor_range} m, the configured range is {required} m")]
    SensorRangeTooShort {
        name: String,
        sensor_range: f32,
        required: f32,
    },

    #[error("expected {expected} effect chains (one per channel), got {actual}")]
    ChainCountMismatch { expected: usize, actual: usize },

    #[error("failed to spawn sensor polling thread: {0}")]
    PollerSpawn(#[source] std::io::Error),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "serde")]
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
