//! Shared state types for UI communication
//!
//! Status updates are `Copy` so the audio callback can send them without
//! allocating.

use std::sync::atomic::AtomicU64;

use gesture_fx::control::VirtualSensorHandle;
use gesture_fx::EffectParameters;

/// Snapshot of the engine sent from the output callback.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusUpdate {
    /// Parameters applied to the effect chain
    pub params: EffectParameters,
    /// Snapshot generation those parameters came from
    pub generation: u64,
    /// Output callbacks processed so far
    pub blocks: u64,
    /// Peak output level of the last reported block
    pub peak: f32,
}

/// Stream health counters, bumped from the audio callbacks.
#[derive(Debug, Default)]
pub struct AudioCounters {
    /// Output callbacks that ran out of captured samples
    pub underruns: AtomicU64,
    /// Input callbacks that found the ring full
    pub overruns: AtomicU64,
}

/// Remote controls for the two virtual sensors.
pub struct Hands {
    pub distortion: VirtualSensorHandle,
    pub delay: VirtualSensorHandle,
}
