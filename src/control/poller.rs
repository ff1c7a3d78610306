//! Sensor polling thread.
//!
//! The poller owns both sensors and the [`ParameterBridge`]. Every poll
//! interval it reads each sensor, feeds the bridge, and goes back to sleep.
//! A failed read is logged once per failure streak and leaves that channel's
//! parameter where it was.
//!
//! [`PollerHandle`] stops the thread: it raises a flag and unparks the thread,
//! which exits within one interval. The sensors live in a [`SensorSet`] whose
//! `Drop` releases them, so they are released on every exit path including a
//! panic inside a sensor driver.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::control::bridge::{ParameterBridge, SensorReadings};
use crate::control::sensor::SensorSource;
use crate::error::{Error, Result, SensorError};

/// A sensor plus its failure-streak bookkeeping.
struct Polled {
    sensor: Box<dyn SensorSource>,
    failing: bool,
}

impl Polled {
    fn new(sensor: Box<dyn SensorSource>) -> Self {
        Self {
            sensor,
            failing: false,
        }
    }

    fn read(&mut self, stats: &PollerCounters) -> Option<f32> {
        match self.sensor.read_distance() {
            Ok(distance) => {
                if self.failing {
                    log::info!("[sensor {}] recovered", self.sensor.name());
                    self.failing = false;
                }
                Some(distance)
            }
            Err(err) => {
                stats.read_failures.fetch_add(1, Ordering::Relaxed);
                if !self.failing {
                    log::warn!(
                        "[sensor {}] read failed, holding last value: {}",
                        self.sensor.name(),
                        err
                    );
                    self.failing = true;
                }
                None
            }
        }
    }
}

/// The distortion and delay sensors. Released when dropped.
pub struct SensorSet {
    distortion: Polled,
    delay: Polled,
    released: bool,
}

impl SensorSet {
    pub fn new(distortion: Box<dyn SensorSource>, delay: Box<dyn SensorSource>) -> Self {
        Self {
            distortion: Polled::new(distortion),
            delay: Polled::new(delay),
            released: false,
        }
    }

    /// Take one reading from each sensor to make sure it is there. A timeout
    /// only means nothing is in front of it; any other error is fatal.
    ///
    /// Each sensor must also reach `required_range`. A shorter sensor never
    /// reports the out-of-range distance that switches its effect off.
    pub fn probe(&mut self, required_range: f32) -> Result<()> {
        for polled in [&mut self.distortion, &mut self.delay] {
            let sensor_range = polled.sensor.max_range();
            if sensor_range < required_range {
                return Err(Error::SensorRangeTooShort {
                    name: polled.sensor.name().to_string(),
                    sensor_range,
                    required: required_range,
                });
            }
            match polled.sensor.read_distance() {
                Ok(_) | Err(SensorError::Timeout) => {}
                Err(source) => {
                    return Err(Error::SensorUnavailable {
                        name: polled.sensor.name().to_string(),
                        source,
                    })
                }
            }
        }
        Ok(())
    }

    fn read(&mut self, stats: &PollerCounters) -> SensorReadings {
        SensorReadings {
            distortion: self.distortion.read(stats),
            delay: self.delay.read(stats),
        }
    }

    /// Release both sensors. Later calls do nothing.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        for polled in [&mut self.distortion, &mut self.delay] {
            log::debug!("[sensor {}] released", polled.sensor.name());
            polled.sensor.release();
        }
    }
}

impl Drop for SensorSet {
    fn drop(&mut self) {
        self.release();
    }
}

#[derive(Debug, Default)]
struct PollerCounters {
    polls: AtomicU64,
    publishes: AtomicU64,
    read_failures: AtomicU64,
}

/// Counters reported by a running poller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollerStats {
    pub polls: u64,
    pub publishes: u64,
    pub read_failures: u64,
}

struct PollerShared {
    shutdown: AtomicBool,
    counters: PollerCounters,
}

pub struct SensorPoller;

impl SensorPoller {
    /// Probe the sensors and start polling them every `interval`.
    ///
    /// Fails with [`Error::SensorUnavailable`] when a sensor cannot be read at
    /// all, or [`Error::SensorRangeTooShort`] when it cannot see as far as the
    /// bridge's range limit. The sensors are released on failure.
    pub fn spawn(
        mut sensors: SensorSet,
        mut bridge: ParameterBridge,
        interval: Duration,
    ) -> Result<PollerHandle> {
        sensors.probe(bridge.max_range())?;

        let shared = Arc::new(PollerShared {
            shutdown: AtomicBool::new(false),
            counters: PollerCounters::default(),
        });
        let thread_shared = shared.clone();

        let handle = thread::Builder::new()
            .name("sensor-poller".into())
            .spawn(move || {
                log::info!("sensor poller started, interval {:?}", interval);
                poll_loop(&mut sensors, &mut bridge, &thread_shared, interval);
                sensors.release();
                log::info!(
                    "sensor poller stopped after {} polls",
                    thread_shared.counters.polls.load(Ordering::Relaxed)
                );
            })
            .map_err(Error::PollerSpawn)?;

        Ok(PollerHandle {
            shared,
            thread: Some(handle),
        })
    }
}

fn poll_loop(
    sensors: &mut SensorSet,
    bridge: &mut ParameterBridge,
    shared: &PollerShared,
    interval: Duration,
) {
    while !shared.shutdown.load(Ordering::Acquire) {
        let deadline = Instant::now() + interval;

        let readings = sensors.read(&shared.counters);
        if bridge.update(readings).is_some() {
            shared.counters.publishes.fetch_add(1, Ordering::Relaxed);
        }
        shared.counters.polls.fetch_add(1, Ordering::Relaxed);

        // park_timeout can wake early; sleep out the rest unless told to stop
        loop {
            if shared.shutdown.load(Ordering::Acquire) {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::park_timeout(deadline - now);
        }
    }
}

/// Owner of a running poller. Dropping it stops the thread.
pub struct PollerHandle {
    shared: Arc<PollerShared>,
    thread: Option<thread::JoinHandle<()>>,
}

impl PollerHandle {
    pub fn stats(&self) -> PollerStats {
        let counters = &self.shared.counters;
        PollerStats {
            polls: counters.polls.load(Ordering::Relaxed),
            publishes: counters.publishes.load(Ordering::Relaxed),
            read_failures: counters.read_failures.load(Ordering::Relaxed),
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop polling and wait for the thread to exit. The sensors are released
    /// by the time this returns.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.thread.take() else {
            return;
        };
        self.shared.shutdown.store(true, Ordering::Release);
        handle.thread().unpark();
        if handle.join().is_err() {
            log::error!("sensor poller thread panicked");
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::control::sensor::{VirtualSensor, VirtualSensorHandle};

    fn sensors() -> (SensorSet, VirtualSensorHandle, VirtualSensorHandle) {
        let (distortion, distortion_handle) = VirtualSensor::new("distortion", 0.35);
        let (delay, delay_handle) = VirtualSensor::new("delay", 0.35);
        let set = SensorSet::new(Box::new(distortion), Box::new(delay));
        (set, distortion_handle, delay_handle)
    }

    #[test]
    fn test_probe_rejects_disconnected_sensor() {
        let (set, _distortion, delay) = sensors();
        delay.disconnect();

        let (bridge, _reader) = ParameterBridge::new(&EngineConfig::default());
        let result = SensorPoller::spawn(set, bridge, Duration::from_millis(1));

        match result {
            Err(Error::SensorUnavailable { name, source }) => {
                assert_eq!(name, "delay");
                assert_eq!(source, SensorError::Disconnected);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("spawn should fail"),
        }
        // Dropped with the failed spawn
        assert!(delay.is_released());
    }

    #[test]
    fn test_probe_tolerates_timeout() {
        let (mut set, distortion, _delay) = sensors();
        distortion.fail_with_timeout();
        assert!(set.probe(0.35).is_ok());
    }

    #[test]
    fn test_short_range_sensor_is_rejected() {
        let (distortion, _distortion_handle) = VirtualSensor::new("distortion", 0.35);
        let (delay, delay_handle) = VirtualSensor::new("delay", 0.2);
        let set = SensorSet::new(Box::new(distortion), Box::new(delay));

        let (bridge, _reader) = ParameterBridge::new(&EngineConfig::default());
        let result = SensorPoller::spawn(set, bridge, Duration::from_millis(1));

        match result {
            Err(Error::SensorRangeTooShort {
                name,
                sensor_range,
                required,
            }) => {
                assert_eq!(name, "delay");
                assert_eq!(sensor_range, 0.2);
                assert_eq!(required, 0.35);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("spawn should fail"),
        }
        assert!(delay_handle.is_released());
    }

    #[test]
    fn test_release_runs_once_on_drop() {
        let (mut set, distortion, delay) = sensors();
        set.release();
        assert!(distortion.is_released());
        assert!(delay.is_released());
        drop(set);
    }

    #[test]
    fn test_shutdown_releases_sensors() {
        let (set, distortion, delay) = sensors();
        let (bridge, _reader) = ParameterBridge::new(&EngineConfig::default());

        let mut handle =
            SensorPoller::spawn(set, bridge, Duration::from_millis(1)).expect("spawn poller");
        assert!(handle.is_running() || handle.stats().polls > 0);

        handle.shutdown();
        assert!(!handle.is_running());
        assert!(distortion.is_released());
        assert!(delay.is_released());

        // Second shutdown is a no-op
        handle.shutdown();
    }
}
