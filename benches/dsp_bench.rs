//! Benchmarks for the effect primitives and the full engine.
//!
//! Run with: cargo bench
//!
//! Every block must finish well inside its real-time deadline.
//!
//! Reference timing at 44.1kHz sample rate:
//!   - 64 samples  = 1.45ms deadline
//!   - 128 samples = 2.90ms deadline
//!   - 256 samples = 5.80ms deadline
//!   - 512 samples = 11.61ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Low-level primitives (delay, distortion, filter, crossfade)
//!   - scenarios/*  The engine as driven by the audio callback

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

/// Sample rate the benchmarks are calibrated for.
pub const SAMPLE_RATE: f32 = 44_100.0;

criterion_group!(
    benches,
    // Low-level DSP primitives
    dsp::bench_delay,
    dsp::bench_distortion,
    dsp::bench_filter,
    dsp::bench_mix,
    // Real-world scenarios
    scenarios::bench_engine,
);
criterion_main!(benches);
