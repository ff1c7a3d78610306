use std::thread;
use std::time::{Duration, Instant};

use gesture_fx::control::{
    ParameterBridge, SensorPoller, SensorSet, VirtualSensor, VirtualSensorHandle,
};
use gesture_fx::{AudioEngine, EngineConfig};

const INTERVAL: Duration = Duration::from_millis(2);

fn rig() -> (SensorSet, VirtualSensorHandle, VirtualSensorHandle) {
    let (distortion, distortion_hand) = VirtualSensor::new("distortion", 0.35);
    let (delay, delay_hand) = VirtualSensor::new("delay", 0.35);
    let set = SensorSet::new(Box::new(distortion), Box::new(delay));
    (set, distortion_hand, delay_hand)
}

/// Poll `condition` until it holds or a generous timeout expires.
fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

#[test]
fn hand_movement_reaches_the_engine() {
    let config = EngineConfig::default();
    let (sensors, distortion_hand, delay_hand) = rig();
    let (bridge, reader) = ParameterBridge::new(&config);
    let mut engine = AudioEngine::new(&config, reader).expect("engine");
    let _poller = SensorPoller::spawn(sensors, bridge, INTERVAL).expect("poller");

    distortion_hand.set_distance(0.0);
    delay_hand.set_distance(0.175);

    let mut block = vec![0.0f32; 128];
    let updated = wait_for(|| {
        engine.process_in_place(&mut block);
        let params = engine.params();
        params.distortion_amount > 0.7 && params.delay_samples > 8_000.0
    });
    assert!(updated, "engine never saw the new parameters: {:?}", engine.params());

    // Pulling both hands away turns both effects off
    distortion_hand.withdraw();
    delay_hand.withdraw();
    let disabled = wait_for(|| {
        engine.process_in_place(&mut block);
        let params = engine.params();
        params.distortion_amount == 0.0 && params.delay_samples == 0.0
    });
    assert!(disabled);
}

#[test]
fn sensor_failure_holds_last_parameters() {
    let config = EngineConfig::default();
    let (sensors, _distortion_hand, delay_hand) = rig();
    let (bridge, mut reader) = ParameterBridge::new(&config);
    let poller = SensorPoller::spawn(sensors, bridge, INTERVAL).expect("poller");

    delay_hand.set_distance(0.1);
    assert!(wait_for(|| reader.read().params.delay_samples > 0.0));
    let before = reader.read();

    delay_hand.fail_with_timeout();
    delay_hand.set_distance(0.3);
    assert!(wait_for(|| poller.stats().read_failures >= 5));
    assert_eq!(reader.read().params, before.params);

    // Recovery picks up the new position
    delay_hand.clear_fault();
    assert!(wait_for(|| reader.read().params.delay_samples > before.params.delay_samples));
}

#[test]
fn shutdown_is_prompt_and_releases_sensors() {
    let config = EngineConfig::default();
    let (sensors, distortion_hand, delay_hand) = rig();
    let (bridge, _reader) = ParameterBridge::new(&config);

    // A long interval: shutdown must not wait for it to elapse
    let mut poller =
        SensorPoller::spawn(sensors, bridge, Duration::from_secs(10)).expect("poller");
    assert!(wait_for(|| poller.stats().polls >= 1));

    let started = Instant::now();
    poller.shutdown();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(!poller.is_running());
    assert!(distortion_hand.is_released());
    assert!(delay_hand.is_released());

    let reads = delay_hand.reads();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(delay_hand.reads(), reads);
}

#[test]
fn dropping_the_handle_stops_polling() {
    let config = EngineConfig::default();
    let (sensors, _distortion_hand, delay_hand) = rig();
    let (bridge, _reader) = ParameterBridge::new(&config);

    let poller = SensorPoller::spawn(sensors, bridge, INTERVAL).expect("poller");
    assert!(wait_for(|| delay_hand.reads() > 2));
    drop(poller);

    assert!(delay_hand.is_released());
}
