pub mod config;
pub mod control; // Sensor polling and the lock-free parameter bridge
pub mod dsp;
pub mod engine;
pub mod error;
pub mod graph; // Composable effect stages
pub mod io;

pub use config::EngineConfig;
pub use control::{
    snapshot_channel, EffectParameters, ParameterBridge, ParameterSnapshot, SnapshotReader,
    SnapshotWriter,
};
pub use engine::AudioEngine;
pub use error::{ConfigError, Error, Result, SensorError};

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Mono or interleaved stereo. Surround layouts are not supported.
pub const MAX_CHANNELS: usize = 2;
