//! Everything between the distance sensors and the audio thread.
//!
//! The polling thread reads the sensors, the bridge turns distances into
//! [`EffectParameters`], and the snapshot channel hands them to the audio
//! engine without locks.

/// Turn smoothed distances into published parameter snapshots.
pub mod bridge;
/// Distance to parameter curves and the deadband.
pub mod mapping;
/// Background thread driving the sensors.
pub mod poller;
/// Sensor trait and the programmable virtual sensor.
pub mod sensor;
/// Running mean of raw readings.
pub mod smoothing;
/// Wait-free triple buffer for parameter snapshots.
pub mod snapshot;

pub use bridge::{ParameterBridge, SensorReadings};
pub use mapping::{linear_scale, log_scale, Hysteresis, RangeMapping};
pub use poller::{PollerHandle, PollerStats, SensorPoller, SensorSet};
pub use sensor::{SensorSource, VirtualSensor, VirtualSensorHandle};
pub use smoothing::MovingAverage;
pub use snapshot::{
    snapshot_channel, EffectParameters, ParameterSnapshot, SnapshotReader, SnapshotWriter,
};
