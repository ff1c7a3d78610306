//! Engine configuration.
//!
//! Every tunable of the processor lives here: stream format, buffer sizing,
//! effect parameter ranges and the sensor-to-parameter mappings. Defaults
//! describe the stock rig: 44.1 kHz, 128-sample blocks and two ultrasonic
//! sensors with a 35 cm range.
//!
//! With the `serde` feature the configuration can be loaded from YAML. Missing
//! fields fall back to their defaults.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::delay::MAX_FEEDBACK_GAIN;
use crate::dsp::distortion::MAX_DISTORTION_AMOUNT;
use crate::error::ConfigError;
use crate::{MAX_BLOCK_SIZE, MAX_CHANNELS};

const MIN_SAMPLE_RATE: u32 = 8_000;
const MAX_SAMPLE_RATE: u32 = 192_000;
const MAX_FILTER_ORDER: usize = 8;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Stream sample rate in Hz.
    pub sample_rate: u32,
    /// Frames per processing block negotiated with the audio device.
    pub block_size: usize,
    /// 1 = mono, 2 = interleaved stereo.
    pub channels: usize,
    /// Length of the delay ring buffer in seconds.
    pub max_delay_seconds: f32,
    /// Gain applied ahead of the effect chain.
    pub trim_gain: f32,
    pub delay: DelayConfig,
    pub distortion: DistortionConfig,
    /// `None` removes the low-pass stage from the chain.
    pub lowpass: Option<LowpassConfig>,
    pub sensors: SensorConfig,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayConfig {
    /// Shortest echo time the delay sensor can select, in seconds.
    pub min_seconds: f32,
    /// Longest echo time the delay sensor can select, in seconds.
    pub max_seconds: f32,
    /// Feedback gain. Must stay below 1 for the echo tail to decay.
    pub feedback_gain: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistortionConfig {
    pub amount_min: f32,
    /// Upper bound of the sensor-driven amount. Must be below 1.
    pub amount_max: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowpassConfig {
    /// Normalized cutoff, where 1.0 is the Nyquist frequency.
    pub cutoff: f32,
    /// Butterworth order (number of poles).
    pub order: usize,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SensorConfig {
    /// Maximum sensing range in meters. Readings at or beyond it disable the
    /// effect the sensor controls.
    pub max_range: f32,
    pub poll_interval_ms: u64,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "distortion_mapping"))]
    pub distortion: SensorMapping,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "delay_mapping"))]
    pub delay: SensorMapping,
}

/// How one sensor's distance is turned into a parameter value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorMapping {
    pub dist_min: f32,
    pub dist_max: f32,
    /// Minimum change in meters before a new reading is applied.
    pub tolerance: f32,
    /// Map nearer distances to larger values.
    pub invert: bool,
    pub curve: MappingCurve,
    /// Number of readings averaged before mapping. 1 disables smoothing.
    pub smoothing_window: usize,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingCurve {
    #[default]
    Linear,
    /// Exponential sweep. Needs strictly positive value bounds.
    Logarithmic,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            block_size: 128,
            channels: 1,
            max_delay_seconds: 4.0,
            trim_gain: 1.0,
            delay: DelayConfig::default(),
            distortion: DistortionConfig::default(),
            lowpass: Some(LowpassConfig::default()),
            sensors: SensorConfig::default(),
        }
    }
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            min_seconds: 0.0,
            max_seconds: 0.4,
            feedback_gain: 0.4,
        }
    }
}

impl Default for DistortionConfig {
    fn default() -> Self {
        Self {
            amount_min: 0.0,
            amount_max: 0.8,
        }
    }
}

impl Default for LowpassConfig {
    fn default() -> Self {
        Self {
            cutoff: 0.02,
            order: 2,
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            max_range: 0.35,
            poll_interval_ms: 10,
            distortion: SensorMapping::distortion_default(),
            delay: SensorMapping::delay_default(),
        }
    }
}

impl Default for SensorMapping {
    fn default() -> Self {
        Self {
            dist_min: 0.0,
            dist_max: 0.35,
            tolerance: 0.03,
            invert: false,
            curve: MappingCurve::Linear,
            smoothing_window: 1,
        }
    }
}

impl EngineConfig {
    /// Number of samples held by each channel's delay ring buffer.
    pub fn delay_capacity(&self) -> usize {
        (self.max_delay_seconds as f64 * self.sample_rate as f64).round() as usize
    }

    /// Real-time budget for one block.
    pub fn block_duration(&self) -> Duration {
        Duration::from_secs_f64(self.block_size as f64 / self.sample_rate as f64)
    }

    pub fn seconds_to_samples(&self, seconds: f32) -> f32 {
        seconds * self.sample_rate as f32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(ConfigError::UnsupportedSampleRate(self.sample_rate));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::InvalidBlockSize {
                size: self.block_size,
                max: MAX_BLOCK_SIZE,
            });
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(ConfigError::UnsupportedChannels {
                channels: self.channels,
                max: MAX_CHANNELS,
            });
        }

        check(
            "max_delay_seconds",
            self.max_delay_seconds,
            self.max_delay_seconds.is_finite() && self.max_delay_seconds > 0.0,
            "> 0",
        )?;
        check(
            "trim_gain",
            self.trim_gain,
            self.trim_gain.is_finite() && self.trim_gain >= 0.0,
            ">= 0",
        )?;

        let delay = &self.delay;
        check(
            "delay.min_seconds",
            delay.min_seconds,
            delay.min_seconds >= 0.0,
            ">= 0",
        )?;
        check(
            "delay.max_seconds",
            delay.max_seconds,
            delay.max_seconds.is_finite() && delay.max_seconds >= delay.min_seconds,
            ">= delay.min_seconds",
        )?;
        check(
            "delay.feedback_gain",
            delay.feedback_gain,
            (0.0..=MAX_FEEDBACK_GAIN).contains(&delay.feedback_gain),
            "0 <= gain <= 0.99",
        )?;

        let capacity = self.delay_capacity();
        let longest = self.seconds_to_samples(delay.max_seconds).ceil() as usize;
        if capacity < 2 || longest >= capacity {
            return Err(ConfigError::DelayExceedsBuffer {
                delay_samples: longest,
                capacity,
            });
        }

        let dist = &self.distortion;
        check(
            "distortion.amount_min",
            dist.amount_min,
            dist.amount_min >= 0.0,
            ">= 0",
        )?;
        check(
            "distortion.amount_max",
            dist.amount_max,
            dist.amount_max >= dist.amount_min && dist.amount_max <= MAX_DISTORTION_AMOUNT,
            "amount_min <= amount < 1",
        )?;

        if let Some(lowpass) = &self.lowpass {
            check(
                "lowpass.cutoff",
                lowpass.cutoff,
                lowpass.cutoff > 0.0 && lowpass.cutoff < 1.0,
                "0 < cutoff < 1 (fraction of Nyquist)",
            )?;
            check(
                "lowpass.order",
                lowpass.order as f32,
                (1..=MAX_FILTER_ORDER).contains(&lowpass.order),
                "1..=8",
            )?;
        }

        let sensors = &self.sensors;
        check(
            "sensors.max_range",
            sensors.max_range,
            sensors.max_range.is_finite() && sensors.max_range > 0.0,
            "> 0",
        )?;
        check(
            "sensors.poll_interval_ms",
            sensors.poll_interval_ms as f32,
            sensors.poll_interval_ms > 0,
            "> 0",
        )?;
        sensors.distortion.validate("sensors.distortion")?;
        sensors.delay.validate("sensors.delay")?;

        if sensors.delay.curve == MappingCurve::Logarithmic && delay.min_seconds <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "delay.min_seconds",
                value: delay.min_seconds as f64,
                expected: "> 0 for a logarithmic delay mapping",
            });
        }
        if sensors.distortion.curve == MappingCurve::Logarithmic && dist.amount_min <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "distortion.amount_min",
                value: dist.amount_min as f64,
                expected: "> 0 for a logarithmic distortion mapping",
            });
        }

        Ok(())
    }

    /// Load and validate a YAML configuration file.
    #[cfg(feature = "serde")]
    pub fn load(path: &std::path::Path) -> crate::Result<Self> {
        log::info!("loading engine config from {:?}", path);

        let contents =
            std::fs::read_to_string(path).map_err(|source| crate::Error::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml(&contents)
    }

    #[cfg(feature = "serde")]
    pub fn from_yaml(contents: &str) -> crate::Result<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }
}

impl SensorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl SensorMapping {
    /// Stock distortion mapping: fine deadband, nearer hand drives harder.
    pub fn distortion_default() -> Self {
        Self {
            tolerance: 0.01,
            invert: true,
            ..Self::default()
        }
    }

    pub fn delay_default() -> Self {
        Self {
            tolerance: 0.03,
            ..Self::default()
        }
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !(self.dist_min >= 0.0 && self.dist_max > self.dist_min) {
            return Err(ConfigError::OutOfRange {
                field,
                value: self.dist_max as f64,
                expected: "0 <= dist_min < dist_max",
            });
        }
        if !(self.tolerance >= 0.0) {
            return Err(ConfigError::OutOfRange {
                field,
                value: self.tolerance as f64,
                expected: "tolerance >= 0",
            });
        }
        if self.smoothing_window == 0 {
            return Err(ConfigError::OutOfRange {
                field,
                value: 0.0,
                expected: "smoothing_window >= 1",
            });
        }
        Ok(())
    }
}

/// A sensor mapping as written in a config file. Missing fields keep the
/// value of the channel's own default mapping, not the generic one.
#[cfg(feature = "serde")]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SensorMappingOverrides {
    dist_min: Option<f32>,
    dist_max: Option<f32>,
    tolerance: Option<f32>,
    invert: Option<bool>,
    curve: Option<MappingCurve>,
    smoothing_window: Option<usize>,
}

#[cfg(feature = "serde")]
impl SensorMappingOverrides {
    fn apply(self, base: SensorMapping) -> SensorMapping {
        SensorMapping {
            dist_min: self.dist_min.unwrap_or(base.dist_min),
            dist_max: self.dist_max.unwrap_or(base.dist_max),
            tolerance: self.tolerance.unwrap_or(base.tolerance),
            invert: self.invert.unwrap_or(base.invert),
            curve: self.curve.unwrap_or(base.curve),
            smoothing_window: self.smoothing_window.unwrap_or(base.smoothing_window),
        }
    }
}

#[cfg(feature = "serde")]
fn distortion_mapping<'de, D>(deserializer: D) -> Result<SensorMapping, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let overrides = SensorMappingOverrides::deserialize(deserializer)?;
    Ok(overrides.apply(SensorMapping::distortion_default()))
}

#[cfg(feature = "serde")]
fn delay_mapping<'de, D>(deserializer: D) -> Result<SensorMapping, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let overrides = SensorMappingOverrides::deserialize(deserializer)?;
    Ok(overrides.apply(SensorMapping::delay_default()))
}

fn check(field: &'static str, value: f32, ok: bool, expected: &'static str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value as f64,
            expected,
        })
    }
}
