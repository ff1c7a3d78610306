//! Benchmarks for crossfading.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use gesture_fx::dsp::mix;

use crate::BLOCK_SIZES;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/mix");

    for &size in BLOCK_SIZES {
        // Generate test signals
        let outgoing: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let incoming: Vec<f32> = (0..size).map(|i| (i as f32 * 0.15).cos()).collect();
        let mut output = vec![0.0f32; size];

        // Whole block as one fade
        group.bench_with_input(BenchmarkId::new("crossfade", size), &size, |b, _| {
            b.iter(|| {
                mix::crossfade(
                    black_box(&outgoing),
                    black_box(&incoming),
                    0,
                    size,
                    black_box(&mut output),
                );
            })
        });

        // Same fade rendered in 16-sample segments, as short delays do
        group.bench_with_input(BenchmarkId::new("crossfade_segmented", size), &size, |b, _| {
            b.iter(|| {
                for start in (0..size).step_by(16) {
                    let end = (start + 16).min(size);
                    mix::crossfade(
                        black_box(&outgoing[start..end]),
                        black_box(&incoming[start..end]),
                        start,
                        size,
                        black_box(&mut output[start..end]),
                    );
                }
            })
        });
    }

    group.finish();
}
