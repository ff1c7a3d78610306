//! Effect stages and the chain that runs them.
//!
//! Graph nodes wrap the low-level DSP primitives with what the engine needs:
//! in-place block rendering, parameter updates from the sensor snapshot, and
//! a uniform reset. `EffectChain` strings them together.

/// Fixed trim gain.
pub mod amplify;
/// Ordered list of stages run in series.
pub mod chain;
/// Feedback delay with crossfaded delay-time changes.
pub mod delay;
/// Amount-controlled waveshaper.
pub mod distortion;
/// Butterworth low-pass.
pub mod filter;
/// Core trait shared by all stages.
pub mod node;

pub use amplify::GainNode;
pub use chain::EffectChain;
pub use delay::DelayNode;
pub use distortion::DistortionNode;
pub use filter::FilterNode;
pub use node::EffectNode;
