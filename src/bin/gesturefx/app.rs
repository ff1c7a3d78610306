//! Audio setup: sensors, engine, cpal duplex streams and the UI loop.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

use gesture_fx::control::{ParameterBridge, SensorPoller, SensorSet, VirtualSensor};
use gesture_fx::{AudioEngine, EngineConfig};

use super::ui::{AudioCounters, Hands, StatusUpdate, UiApp};

/// Blocks of slack between the input and output callbacks.
const RING_BLOCKS: usize = 8;

/// Send a status update to the UI every this many output callbacks.
const STATUS_EVERY: u64 = 8;

pub fn run(config: EngineConfig) -> EyreResult<()> {
    config.validate().wrap_err("invalid configuration")?;

    // Sensors, bridge and engine
    let max_range = config.sensors.max_range;
    let (distortion_sensor, distortion_hand) = VirtualSensor::new("distortion", max_range);
    let (delay_sensor, delay_hand) = VirtualSensor::new("delay", max_range);
    let sensors = SensorSet::new(Box::new(distortion_sensor), Box::new(delay_sensor));

    let (bridge, reader) = ParameterBridge::new(&config);
    let mut engine = AudioEngine::new(&config, reader)?;
    let poller = SensorPoller::spawn(sensors, bridge, config.sensors.poll_interval())?;

    // Devices
    let host = cpal::default_host();
    let input_device = host
        .default_input_device()
        .ok_or_else(|| eyre!("no default input device available"))?;
    let output_device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    log::info!(
        "input: {}, output: {}",
        input_device.name().unwrap_or_else(|_| "unknown".into()),
        output_device.name().unwrap_or_else(|_| "unknown".into())
    );

    let stream_config = cpal::StreamConfig {
        channels: config.channels as u16,
        sample_rate: cpal::SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Fixed(config.block_size as u32),
    };

    // Captured samples travel from the input callback to the output callback
    let (mut sample_tx, mut sample_rx) =
        RingBuffer::<f32>::new(config.block_size * config.channels * RING_BLOCKS);
    let (mut status_tx, status_rx) = RingBuffer::<StatusUpdate>::new(64);
    let counters = Arc::new(AudioCounters::default());

    let input_counters = counters.clone();
    let input_stream = input_device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _| {
                for &sample in data {
                    if sample_tx.push(sample).is_err() {
                        input_counters.overruns.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                }
            },
            |err| log::error!("input stream error: {}", err),
            None,
        )
        .wrap_err("failed to open input stream")?;

    let output_counters = counters.clone();
    let output_stream = output_device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _| {
                let mut short = false;
                for slot in data.iter_mut() {
                    *slot = match sample_rx.pop() {
                        Ok(sample) => sample,
                        Err(_) => {
                            short = true;
                            0.0
                        }
                    };
                }
                if short {
                    output_counters.underruns.fetch_add(1, Ordering::Relaxed);
                }

                engine.process_in_place(data);

                if engine.blocks_processed() % STATUS_EVERY == 0 {
                    let peak = data.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
                    // UI lagging behind is fine; drop the update
                    let _ = status_tx.push(StatusUpdate {
                        params: engine.params(),
                        generation: engine.generation(),
                        blocks: engine.blocks_processed(),
                        peak,
                    });
                }
            },
            |err| log::error!("output stream error: {}", err),
            None,
        )
        .wrap_err("failed to open output stream")?;

    input_stream.play().wrap_err("failed to start input stream")?;
    output_stream.play().wrap_err("failed to start output stream")?;
    log::info!(
        "streaming at {} Hz, {} frames per block",
        config.sample_rate,
        config.block_size
    );

    let hands = Hands {
        distortion: distortion_hand,
        delay: delay_hand,
    };
    let mut ui = UiApp::new(config, hands, status_rx, counters.clone(), poller);

    let mut terminal = ratatui::init();
    let result = ui.run(&mut terminal);
    ratatui::restore();

    drop(output_stream);
    drop(input_stream);
    // Stops the poller and releases the sensors
    drop(ui);

    log::info!(
        "stopped: {} underruns, {} overruns",
        counters.underruns.load(Ordering::Relaxed),
        counters.overruns.load(Ordering::Relaxed)
    );
    result
}
