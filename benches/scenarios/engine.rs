//! Benchmarks for the full effect chain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use gesture_fx::{snapshot_channel, AudioEngine, EffectParameters, EngineConfig};

use crate::BLOCK_SIZES;

fn active() -> EffectParameters {
    EffectParameters {
        distortion_amount: 0.6,
        delay_samples: 11_025.5,
        delay_gain: 0.4,
    }
}

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let config = EngineConfig {
            block_size: size,
            ..EngineConfig::default()
        };
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let mut output = vec![0.0f32; size];

        // === STEADY STATE ===
        // All stages active, no parameter changes
        let (_writer, reader) = snapshot_channel(active());
        let mut engine = AudioEngine::new(&config, reader).expect("valid config");
        group.bench_with_input(BenchmarkId::new("steady", size), &size, |b, _| {
            b.iter(|| {
                engine.process(black_box(&input), black_box(&mut output));
            })
        });

        // === MOVING HAND ===
        // A new snapshot before every block: parameter fan-out plus a delay
        // crossfade each time
        let (mut writer, reader) = snapshot_channel(active());
        let mut engine = AudioEngine::new(&config, reader).expect("valid config");
        let mut step = 0u32;
        group.bench_with_input(BenchmarkId::new("moving_hand", size), &size, |b, _| {
            b.iter(|| {
                step = step.wrapping_add(1);
                writer.publish(EffectParameters {
                    delay_samples: 4_410.0 + (step % 64) as f32 * 100.0,
                    ..active()
                });
                engine.process(black_box(&input), black_box(&mut output));
            })
        });

        // === STEREO, FIXED POINT ===
        // Interleaved i16 in and out, one chain per channel
        let stereo = EngineConfig {
            channels: 2,
            ..config.clone()
        };
        let (_writer, reader) = snapshot_channel(active());
        let mut engine = AudioEngine::new(&stereo, reader).expect("valid config");
        let fixed_in: Vec<i16> = (0..size * 2)
            .map(|i| ((i as f32 * 0.05).sin() * 16_000.0) as i16)
            .collect();
        let mut fixed_out = vec![0i16; size * 2];
        group.bench_with_input(BenchmarkId::new("stereo_i16", size), &size, |b, _| {
            b.iter(|| {
                engine.process_i16(black_box(&fixed_in), black_box(&mut fixed_out));
            })
        });
    }

    group.finish();
}
