//! Real-world scenario benchmarks.
//!
//! These benchmarks drive the engine the way the audio callback does,
//! including parameter updates arriving from the sensor thread.

mod engine;

pub use engine::bench_engine;
