//! Benchmarks for waveshaping distortion.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use gesture_fx::dsp::distortion::Distortion;

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sine-like values)
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for &amount in &[0.3f32, 0.8, 0.999] {
            let shaper = Distortion::new(amount);
            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("amount_{}", amount), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        shaper.apply_buffer(black_box(&mut buffer));
                    })
                },
            );
        }

        // 16-bit magnitudes, rescaled around the curve
        let shaper = Distortion::new(0.8).with_full_scale(i16::MAX as f32);
        let fixed: Vec<f32> = input.iter().map(|s| s * i16::MAX as f32).collect();
        let mut buffer = fixed.clone();
        group.bench_with_input(BenchmarkId::new("full_scale_i16", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&fixed);
                shaper.apply_buffer(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
