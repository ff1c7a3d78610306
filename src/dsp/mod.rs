//! Low-level DSP primitives used by the effect graph nodes.
//!
//! These components are allocation-free once constructed and realtime-safe,
//! so they can run directly inside the audio callback. They stay focused on
//! the signal-processing math; parameter plumbing lives in `graph` and
//! `control`.

/// Gain scaling.
pub mod amplify;
/// Circular delay line with fractional reads and crossfaded time changes.
pub mod delay;
/// Memoryless waveshaping distortion.
pub mod distortion;
/// Butterworth low-pass built from cascaded second-order sections.
pub mod filter;
/// Crossfade ramps.
pub mod mix;

pub use delay::{CrossfadeState, DelayLine};
pub use distortion::Distortion;
pub use filter::{Biquad, LowpassFilter};
