//! Benchmarks for delay line operations.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use gesture_fx::dsp::delay::DelayLine;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    // Test with different delay times (in samples)
    let delay_times: &[f32] = &[
        441.0,     // 10ms at 44.1kHz
        4_410.0,   // 100ms
        17_640.0,  // 400ms, the longest the delay sensor selects
        8_820.37,  // fractional, as produced by distance mapping
    ];

    for &size in BLOCK_SIZES {
        // Generate a test signal
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for &delay_samples in delay_times {
            let mut delay = DelayLine::with_duration(4.0, SAMPLE_RATE, 0.4);
            delay.set_delay(delay_samples);
            delay.reset();

            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("process_{}", delay_samples), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        delay.process(black_box(&mut buffer));
                    })
                },
            );
        }

        // Worst case: a new delay time every block, so every block crossfades
        let mut delay = DelayLine::with_duration(4.0, SAMPLE_RATE, 0.4);
        let mut buffer = input.clone();
        let mut toggle = false;
        group.bench_with_input(BenchmarkId::new("crossfade", size), &size, |b, _| {
            b.iter(|| {
                toggle = !toggle;
                delay.set_delay(if toggle { 4_410.0 } else { 13_230.5 });
                buffer.copy_from_slice(&input);
                delay.process(black_box(&mut buffer));
            })
        });

        // Fractional read straddling the end of the ring
        let mut delay = DelayLine::new(4_096, 0.0);
        delay.write(&[0.5; 4_096]);
        let mut out = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("read_at_wrapped", size), &size, |b, _| {
            b.iter(|| {
                delay.read_at(black_box(4_096.0 - size as f64 / 2.0 + 0.25), &mut out);
            })
        });
    }

    group.finish();
}
