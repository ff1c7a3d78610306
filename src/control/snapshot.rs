//! Wait-free parameter exchange between the sensor thread and the audio
//! callback.

/*
Triple Buffer
=============

The polling thread produces effect parameters whenever a hand moves; the audio
callback consumes them once per block. The callback must never wait for the
poller, and a half-written set of parameters must never reach the DSP.

Three slots hold complete snapshots:

  back     owned by the writer, filled privately
  middle   shared, the most recently published snapshot
  front    owned by the reader, what the audio thread is using

A single atomic byte stores the index of the middle slot plus a FRESH bit.

  publish:  fill back → swap(back | FRESH) into middle → old middle is the
            new back
  read:     if FRESH is set → swap(front) into middle → old middle is the
            new front

Both swaps are single atomic operations, so neither side ever blocks, spins
or allocates. The reader may skip intermediate snapshots when the writer
publishes faster than blocks are processed, but always sees a complete one.

        writer                  shared                 reader
     ┌────────┐  swap(b|F)   ┌────────┐  swap(f)   ┌────────┐
     │  back  │ ───────────→ │ middle │ ─────────→ │ front  │
     └────────┘ ←─────────── └────────┘ ←───────── └────────┘
                  old middle               old middle

Ownership mirrors an rtrb ring: `snapshot_channel` returns a `SnapshotWriter`
and a `SnapshotReader`, each `Send` but not `Clone`, so there is exactly one
of each.
*/

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::delay::MAX_FEEDBACK_GAIN;
use crate::dsp::distortion::MAX_DISTORTION_AMOUNT;

const INDEX_MASK: u8 = 0b011;
const FRESH: u8 = 0b100;

/// The sensor-driven parameters of the effect chain.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectParameters {
    /// Waveshaper amount in `[0, 1)`. 0 is clean.
    pub distortion_amount: f32,
    /// Echo time in samples. 0 bypasses the delay.
    pub delay_samples: f32,
    /// Feedback gain of the delay in `[0, 1)`.
    pub delay_gain: f32,
}

impl EffectParameters {
    /// Both effects disabled.
    pub const BYPASS: Self = Self {
        distortion_amount: 0.0,
        delay_samples: 0.0,
        delay_gain: 0.0,
    };

    /// Clamp every field into the range the DSP stages accept. Non-finite
    /// values become 0.
    pub fn sanitized(self, max_delay_samples: f32) -> Self {
        Self {
            distortion_amount: finite_clamp(self.distortion_amount, 0.0, MAX_DISTORTION_AMOUNT),
            delay_samples: finite_clamp(self.delay_samples, 0.0, max_delay_samples),
            delay_gain: finite_clamp(self.delay_gain, 0.0, MAX_FEEDBACK_GAIN),
        }
    }
}

#[inline]
fn finite_clamp(value: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        0.0
    }
}

/// A published set of parameters and its sequence number.
///
/// The generation starts at 0 for the initial value and increases by one with
/// every publish, which lets the reader detect changes without comparing
/// floats.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParameterSnapshot {
    pub params: EffectParameters,
    pub generation: u64,
}

struct Shared {
    slots: [UnsafeCell<ParameterSnapshot>; 3],
    middle: AtomicU8,
}

// SAFETY: each slot index is owned by exactly one of writer (back), shared
// (middle) or reader (front) at any time. Ownership only moves through the
// AcqRel swaps on `middle`, which also order the slot contents.
unsafe impl Sync for Shared {}

/// Create a connected writer/reader pair holding `initial`.
pub fn snapshot_channel(initial: EffectParameters) -> (SnapshotWriter, SnapshotReader) {
    let snapshot = ParameterSnapshot {
        params: initial,
        generation: 0,
    };
    let shared = Arc::new(Shared {
        slots: [
            UnsafeCell::new(snapshot),
            UnsafeCell::new(snapshot),
            UnsafeCell::new(snapshot),
        ],
        middle: AtomicU8::new(1),
    });

    let writer = SnapshotWriter {
        shared: shared.clone(),
        back: 2,
        latest: snapshot,
    };
    let reader = SnapshotReader { shared, front: 0 };
    (writer, reader)
}

/// Publishing half. Lives on the sensor polling thread.
pub struct SnapshotWriter {
    shared: Arc<Shared>,
    back: u8,
    latest: ParameterSnapshot,
}

impl SnapshotWriter {
    /// Publish a new set of parameters and return its generation.
    pub fn publish(&mut self, params: EffectParameters) -> u64 {
        let snapshot = ParameterSnapshot {
            params,
            generation: self.latest.generation + 1,
        };

        // SAFETY: `back` is owned by this writer until the swap below.
        unsafe {
            *self.shared.slots[self.back as usize].get() = snapshot;
        }
        let previous = self
            .shared
            .middle
            .swap(self.back | FRESH, Ordering::AcqRel);
        self.back = previous & INDEX_MASK;
        self.latest = snapshot;

        snapshot.generation
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> ParameterSnapshot {
        self.latest
    }
}

/// Consuming half. Lives on the audio thread.
pub struct SnapshotReader {
    shared: Arc<Shared>,
    front: u8,
}

impl SnapshotReader {
    /// Return the newest complete snapshot. Never blocks.
    pub fn read(&mut self) -> ParameterSnapshot {
        if self.shared.middle.load(Ordering::Relaxed) & FRESH != 0 {
            let previous = self.shared.middle.swap(self.front, Ordering::AcqRel);
            self.front = previous & INDEX_MASK;
        }
        // SAFETY: `front` is owned by this reader until the next swap.
        unsafe { *self.shared.slots[self.front as usize].get() }
    }

    /// Whether a snapshot newer than the last `read` has been published.
    pub fn has_update(&self) -> bool {
        self.shared.middle.load(Ordering::Relaxed) & FRESH != 0
    }
}
