//! Distance sensors.
//!
//! [`SensorSource`] is the boundary to whatever hardware measures the hand
//! position. The library ships [`VirtualSensor`], driven from another thread
//! through a [`VirtualSensorHandle`], which the demo binary maps to keys and
//! the tests use to script readings and faults.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::SensorError;

/// A source of distance measurements in meters.
pub trait SensorSource: Send {
    fn name(&self) -> &str;

    /// Take one measurement. May block for up to the sensor's timeout.
    fn read_distance(&mut self) -> Result<f32, SensorError>;

    /// Distance at and beyond which the sensor reports "nothing there".
    fn max_range(&self) -> f32;

    /// Release pins, file handles or whatever else the sensor holds. Called
    /// once when polling stops.
    fn release(&mut self) {}
}

impl SensorSource for Box<dyn SensorSource> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_distance(&mut self) -> Result<f32, SensorError> {
        (**self).read_distance()
    }

    fn max_range(&self) -> f32 {
        (**self).max_range()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

#[derive(Debug)]
struct VirtualState {
    // f32 bits
    distance: AtomicU32,
    fault: AtomicU32,
    released: AtomicBool,
    reads: AtomicU64,
}

const NO_FAULT: u32 = 0;
const FAULT_TIMEOUT: u32 = 1;
const FAULT_DISCONNECTED: u32 = 2;

/// A sensor whose distance is set programmatically.
pub struct VirtualSensor {
    name: String,
    max_range: f32,
    state: Arc<VirtualState>,
}

/// Remote control for a [`VirtualSensor`].
#[derive(Clone)]
pub struct VirtualSensorHandle {
    max_range: f32,
    state: Arc<VirtualState>,
}

impl VirtualSensor {
    /// Create a sensor reporting `max_range` (no hand) until told otherwise.
    pub fn new(name: impl Into<String>, max_range: f32) -> (Self, VirtualSensorHandle) {
        let state = Arc::new(VirtualState {
            distance: AtomicU32::new(max_range.to_bits()),
            fault: AtomicU32::new(NO_FAULT),
            released: AtomicBool::new(false),
            reads: AtomicU64::new(0),
        });
        let handle = VirtualSensorHandle {
            max_range,
            state: state.clone(),
        };
        let sensor = Self {
            name: name.into(),
            max_range,
            state,
        };
        (sensor, handle)
    }
}

impl SensorSource for VirtualSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_distance(&mut self) -> Result<f32, SensorError> {
        self.state.reads.fetch_add(1, Ordering::Relaxed);

        match self.state.fault.load(Ordering::Acquire) {
            FAULT_TIMEOUT => return Err(SensorError::Timeout),
            FAULT_DISCONNECTED => return Err(SensorError::Disconnected),
            _ => {}
        }

        let distance = f32::from_bits(self.state.distance.load(Ordering::Acquire));
        if distance.is_finite() && distance >= 0.0 {
            Ok(distance)
        } else {
            Err(SensorError::InvalidReading(distance))
        }
    }

    fn max_range(&self) -> f32 {
        self.max_range
    }

    fn release(&mut self) {
        self.state.released.store(true, Ordering::Release);
    }
}

impl VirtualSensorHandle {
    pub fn set_distance(&self, meters: f32) {
        self.state.distance.store(meters.to_bits(), Ordering::Release);
    }

    pub fn distance(&self) -> f32 {
        f32::from_bits(self.state.distance.load(Ordering::Acquire))
    }

    /// Move the hand by `delta` meters, staying within `[0, max_range]`.
    pub fn nudge(&self, delta: f32) {
        let next = (self.distance() + delta).clamp(0.0, self.max_range);
        self.set_distance(next);
    }

    /// Take the hand away.
    pub fn withdraw(&self) {
        self.set_distance(self.max_range);
    }

    /// Make subsequent reads time out.
    pub fn fail_with_timeout(&self) {
        self.state.fault.store(FAULT_TIMEOUT, Ordering::Release);
    }

    /// Make subsequent reads report a disconnected sensor.
    pub fn disconnect(&self) {
        self.state.fault.store(FAULT_DISCONNECTED, Ordering::Release);
    }

    pub fn clear_fault(&self) {
        self.state.fault.store(NO_FAULT, Ordering::Release);
    }

    pub fn is_faulted(&self) -> bool {
        self.state.fault.load(Ordering::Acquire) != NO_FAULT
    }

    pub fn is_released(&self) -> bool {
        self.state.released.load(Ordering::Acquire)
    }

    pub fn reads(&self) -> u64 {
        self.state.reads.load(Ordering::Relaxed)
    }
}
