//! Sensor readings in, parameter snapshots out.
//!
//! The bridge owns the [`SnapshotWriter`] half of the parameter channel. Each
//! call to [`ParameterBridge::update`] takes the latest distances, smooths
//! them, applies the per-channel deadband and mapping, and publishes a new
//! snapshot only when the resulting parameters actually changed.

use crate::config::{EngineConfig, SensorMapping};
use crate::control::mapping::{Hysteresis, RangeMapping};
use crate::control::smoothing::MovingAverage;
use crate::control::snapshot::{
    snapshot_channel, EffectParameters, ParameterSnapshot, SnapshotReader, SnapshotWriter,
};
use crate::dsp::distortion::MAX_DISTORTION_AMOUNT;

/// One poll's worth of distances. `None` means the sensor could not be read
/// this time; its channel holds its previous value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorReadings {
    pub distortion: Option<f32>,
    pub delay: Option<f32>,
}

/// Per-sensor processing: smoothing, deadband, out-of-range sentinel and
/// mapping.
#[derive(Debug, Clone)]
struct Channel {
    smoother: MovingAverage,
    gate: Hysteresis,
    mapping: RangeMapping,
    max_range: f32,
}

impl Channel {
    fn new(config: &SensorMapping, max_range: f32, val_min: f32, val_max: f32) -> Self {
        Self {
            smoother: MovingAverage::new(config.smoothing_window, max_range),
            gate: Hysteresis::new(config.tolerance, max_range),
            mapping: RangeMapping::from_config(config, val_min, val_max),
            max_range,
        }
    }

    /// Feed a reading. Returns the channel's value when the committed
    /// distance changed.
    ///
    /// NaN and negative distances are dropped like a failed read. Infinity
    /// counts as out of range.
    fn update(&mut self, distance: f32) -> Option<f32> {
        if distance.is_nan() || distance < 0.0 {
            return None;
        }
        let distance = if distance.is_infinite() {
            self.max_range
        } else {
            distance
        };
        let smoothed = self.smoother.push(distance);

        // Crossing the range limit always commits, so pulling the hand away
        // switches the effect off even within the tolerance
        let was_far = self.gate.committed() >= self.max_range;
        let is_far = smoothed >= self.max_range;
        if was_far != is_far {
            self.gate.force(smoothed);
        } else if !self.gate.update(smoothed) {
            return None;
        }

        Some(self.value())
    }

    /// The committed value. 0 while nothing is in range.
    fn value(&self) -> f32 {
        let distance = self.gate.committed();
        if distance >= self.max_range {
            0.0
        } else {
            self.mapping.map(distance)
        }
    }

    fn committed_distance(&self) -> f32 {
        self.gate.committed()
    }
}

pub struct ParameterBridge {
    writer: SnapshotWriter,
    distortion: Channel,
    delay: Channel,
    params: EffectParameters,
    sample_rate: f32,
    max_delay_samples: f32,
    max_range: f32,
}

impl ParameterBridge {
    /// Create a bridge and the reader half for the audio engine. Both effects
    /// start disabled.
    pub fn new(config: &EngineConfig) -> (Self, SnapshotReader) {
        let sensors = &config.sensors;
        let initial = EffectParameters {
            distortion_amount: 0.0,
            delay_samples: 0.0,
            delay_gain: config.delay.feedback_gain,
        };
        let (writer, reader) = snapshot_channel(initial);

        let bridge = Self {
            writer,
            distortion: Channel::new(
                &sensors.distortion,
                sensors.max_range,
                config.distortion.amount_min,
                config.distortion.amount_max.min(MAX_DISTORTION_AMOUNT),
            ),
            delay: Channel::new(
                &sensors.delay,
                sensors.max_range,
                config.delay.min_seconds,
                config.delay.max_seconds,
            ),
            params: initial,
            sample_rate: config.sample_rate as f32,
            max_delay_samples: config.delay_capacity().saturating_sub(1) as f32,
            max_range: sensors.max_range,
        };
        (bridge, reader)
    }

    /// Process one set of readings. Returns the published snapshot, or `None`
    /// if the parameters did not change.
    pub fn update(&mut self, readings: SensorReadings) -> Option<ParameterSnapshot> {
        let mut next = self.params;

        if let Some(amount) = readings.distortion.and_then(|d| self.distortion.update(d)) {
            next.distortion_amount = amount.clamp(0.0, MAX_DISTORTION_AMOUNT);
        }
        if let Some(seconds) = readings.delay.and_then(|d| self.delay.update(d)) {
            next.delay_samples = (seconds * self.sample_rate).clamp(0.0, self.max_delay_samples);
        }

        if next == self.params {
            return None;
        }

        self.params = next;
        let generation = self.writer.publish(next);
        log::debug!(
            "published parameters #{}: distortion {:.3}, delay {:.1} samples",
            generation,
            next.distortion_amount,
            next.delay_samples
        );

        Some(ParameterSnapshot {
            params: next,
            generation,
        })
    }

    /// Parameters as of the last publish.
    pub fn params(&self) -> EffectParameters {
        self.params
    }

    /// Distance at and beyond which an effect is switched off.
    pub fn max_range(&self) -> f32 {
        self.max_range
    }

    pub fn latest(&self) -> ParameterSnapshot {
        self.writer.latest()
    }

    /// Committed (post-smoothing, post-deadband) distances for
    /// `(distortion, delay)`.
    pub fn committed_distances(&self) -> (f32, f32) {
        (
            self.distortion.committed_distance(),
            self.delay.committed_distance(),
        )
    }
}
