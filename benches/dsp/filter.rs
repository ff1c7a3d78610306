//! Benchmarks for the Butterworth low-pass cascade.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use gesture_fx::dsp::filter::LowpassFilter;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        // Order 2 is one biquad; order 5 is two biquads plus a first-order
        for &order in &[2usize, 4, 5] {
            let mut filter = LowpassFilter::butterworth(order, 0.02);
            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("order_{}", order), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        filter.process(black_box(&mut buffer));
                    })
                },
            );
        }
    }

    group.finish();
}
