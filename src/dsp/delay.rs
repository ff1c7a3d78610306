//! Feedback delay line
//!
//! A fixed-capacity ring buffer holding the recent (post-feedback) output of
//! the stage. Each block reads the samples that were written `delay_samples`
//! ago, mixes them into the input, and writes the mix back so the echo itself
//! echoes:
//!
//! ```text
//!   input ──(+)──────────────┬──→ output
//!            ↑               │
//!            │  × gain       ↓
//!            └──── ring buffer (write cursor advances every block)
//! ```
//!
//! # Cursors
//!
//! The write cursor is an integer index; the read cursor is derived from it as
//! `write - delay (mod capacity)` and may land between two samples, because
//! sensor-driven delay times are rarely whole numbers. Fractional reads
//! interpolate linearly between the two neighbouring samples.
//!
//! # Changing the delay time
//!
//! Moving the read cursor in one step splices two unrelated parts of the
//! history together and clicks. `set_delay` therefore only arms a
//! [`CrossfadeState`]; the next `process` call renders both the old and the
//! new delay, fades from one to the other across the block, and commits the
//! new time at the end.
//!
//! # Short delays
//!
//! When the delay is shorter than the block, part of the read window has not
//! been written yet. Blocks are processed in segments no longer than
//! `floor(delay)` so every read sees already-written, post-feedback samples.

use crate::dsp::mix::crossfade;
use crate::MAX_BLOCK_SIZE;

/// Largest accepted feedback gain. Anything at or above 1 makes the echo tail
/// grow without bound.
pub const MAX_FEEDBACK_GAIN: f32 = 0.99;

/// A pending delay-time change, rendered during the next processed block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeState {
    pub old_delay_samples: f32,
    pub new_delay_samples: f32,
    pub active: bool,
}

impl CrossfadeState {
    const IDLE: Self = Self {
        old_delay_samples: 0.0,
        new_delay_samples: 0.0,
        active: false,
    };
}

pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
    read_pos: f64,
    delay_samples: f32,
    gain: f32,
    crossfade: CrossfadeState,
    // Pre-allocated so `process` never allocates
    old_scratch: Vec<f32>,
    new_scratch: Vec<f32>,
}

impl DelayLine {
    /// Create a delay line holding `capacity` samples. The delay starts at 0
    /// (bypass).
    pub fn new(capacity: usize, gain: f32) -> Self {
        let capacity = capacity.max(2);
        Self {
            buffer: vec![0.0; capacity],
            write_pos: 0,
            read_pos: 0.0,
            delay_samples: 0.0,
            gain: clamp_gain(gain),
            crossfade: CrossfadeState::IDLE,
            old_scratch: vec![0.0; MAX_BLOCK_SIZE],
            new_scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Create a delay line sized to hold `seconds` of audio.
    pub fn with_duration(seconds: f32, sample_rate: f32, gain: f32) -> Self {
        Self::new((seconds * sample_rate).round() as usize, gain)
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn write_cursor(&self) -> usize {
        self.write_pos
    }

    pub fn read_cursor(&self) -> f64 {
        self.read_pos
    }

    /// The delay currently being rendered. During a pending crossfade this is
    /// still the old value.
    pub fn delay_samples(&self) -> f32 {
        self.delay_samples
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn crossfade(&self) -> CrossfadeState {
        self.crossfade
    }

    /// Set the feedback gain, clamped to `[0, MAX_FEEDBACK_GAIN]`.
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = clamp_gain(gain);
    }

    /// Request a new delay time.
    ///
    /// Zero disables the echo. Non-zero values are clamped to
    /// `[1, capacity - 1]`. The change takes effect over the next processed
    /// block through a crossfade.
    pub fn set_delay(&mut self, delay_samples: f32) {
        let target = self.clamp_delay(delay_samples);

        if self.crossfade.active {
            if target == self.crossfade.new_delay_samples {
                return;
            }
            if target == self.delay_samples {
                // Changed back before the fade ran
                self.crossfade = CrossfadeState::IDLE;
                return;
            }
        } else if target == self.delay_samples {
            return;
        }

        self.crossfade = CrossfadeState {
            old_delay_samples: self.delay_samples,
            new_delay_samples: target,
            active: true,
        };
    }

    /// Copy `block` into the ring at the write cursor and advance the cursor
    /// by `block.len() mod capacity`.
    pub fn write(&mut self, block: &[f32]) {
        let capacity = self.buffer.len();

        // Only the newest `capacity` samples survive a longer write
        let skipped = block.len().saturating_sub(capacity);
        let src = &block[skipped..];
        let start = (self.write_pos + skipped) % capacity;

        let first = (capacity - start).min(src.len());
        self.buffer[start..start + first].copy_from_slice(&src[..first]);
        let rest = src.len() - first;
        self.buffer[..rest].copy_from_slice(&src[first..]);

        self.write_pos = (start + src.len()) % capacity;
    }

    /// Fill `out` with the samples starting at logical position `index`.
    ///
    /// `index` is taken modulo the capacity and may be fractional, in which
    /// case each output sample is interpolated between `floor(index) + i` and
    /// `floor(index) + i + 1`.
    pub fn read_at(&self, index: f64, out: &mut [f32]) {
        read_wrapped(&self.buffer, index, out);
    }

    /// Run one block through the delay in place.
    pub fn process(&mut self, block: &mut [f32]) {
        if block.is_empty() {
            return;
        }

        if self.crossfade.active {
            let CrossfadeState {
                old_delay_samples: old,
                new_delay_samples: new,
                ..
            } = self.crossfade;

            let total = block.len();
            let segment = segment_len(&[old, new]);
            let mut start = 0;
            while start < total {
                let end = (start + segment).min(total);
                self.render_crossfade(&mut block[start..end], old, new, start, total);
                start = end;
            }

            self.delay_samples = new;
            self.crossfade = CrossfadeState::IDLE;
        } else if self.delay_samples == 0.0 {
            // Bypass. History keeps recording so a later delay has material.
            self.write(block);
        } else {
            let delay = self.delay_samples;
            let segment = segment_len(&[delay]);
            for chunk in block.chunks_mut(segment) {
                self.render_feedback(chunk, delay);
            }
        }

        self.update_read_cursor();
    }

    /// Clear the history, rewind the cursors and commit any pending delay
    /// change without fading.
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
        if self.crossfade.active {
            self.delay_samples = self.crossfade.new_delay_samples;
            self.crossfade = CrossfadeState::IDLE;
        }
        self.update_read_cursor();
    }

    fn render_feedback(&mut self, segment: &mut [f32], delay: f32) {
        let n = segment.len();
        let delayed = &mut self.old_scratch[..n];
        read_wrapped(&self.buffer, self.write_pos as f64 - delay as f64, delayed);

        for (sample, &echo) in segment.iter_mut().zip(delayed.iter()) {
            *sample += echo * self.gain;
        }
        self.write(segment);
    }

    fn render_crossfade(&mut self, segment: &mut [f32], old: f32, new: f32, offset: usize, total: usize) {
        let n = segment.len();
        let write_pos = self.write_pos as f64;
        read_delayed(&self.buffer, write_pos, old, &mut self.old_scratch[..n]);
        read_delayed(&self.buffer, write_pos, new, &mut self.new_scratch[..n]);

        // Turn both taps into full feedback mixes, then blend them
        let gain = self.gain;
        for ((&input, old), new) in segment
            .iter()
            .zip(self.old_scratch[..n].iter_mut())
            .zip(self.new_scratch[..n].iter_mut())
        {
            *old = input + *old * gain;
            *new = input + *new * gain;
        }
        crossfade(&self.old_scratch[..n], &self.new_scratch[..n], offset, total, segment);
        self.write(segment);
    }

    fn update_read_cursor(&mut self) {
        let capacity = self.buffer.len() as f64;
        self.read_pos = (self.write_pos as f64 - self.delay_samples as f64).rem_euclid(capacity);
    }

    fn clamp_delay(&self, delay_samples: f32) -> f32 {
        if !delay_samples.is_finite() || delay_samples <= 0.0 {
            0.0
        } else {
            delay_samples.clamp(1.0, (self.buffer.len() - 1) as f32)
        }
    }
}

#[inline]
fn clamp_gain(gain: f32) -> f32 {
    if gain.is_finite() {
        gain.clamp(0.0, MAX_FEEDBACK_GAIN)
    } else {
        0.0
    }
}

/// Longest segment for which every read position of every listed delay has
/// already been written.
fn segment_len(delays: &[f32]) -> usize {
    delays
        .iter()
        .filter(|&&d| d > 0.0)
        .map(|&d| d.floor() as usize)
        .fold(MAX_BLOCK_SIZE, usize::min)
        .max(1)
}

/// Read the samples written `delay` samples before `write_pos`. A zero delay
/// contributes silence.
fn read_delayed(buffer: &[f32], write_pos: f64, delay: f32, out: &mut [f32]) {
    if delay == 0.0 {
        out.fill(0.0);
    } else {
        read_wrapped(buffer, write_pos - delay as f64, out);
    }
}

fn read_wrapped(buffer: &[f32], index: f64, out: &mut [f32]) {
    let capacity = buffer.len();
    let index = index.rem_euclid(capacity as f64);
    let base = index.floor();
    let frac = (index - base) as f32;
    // rem_euclid can round up to exactly `capacity`
    let base = base as usize % capacity;

    if frac == 0.0 {
        copy_wrapped(buffer, base, out);
        return;
    }

    // Each tap wraps on its own, so a window straddling the end of the buffer
    // (or a `floor + 1` landing on index 0) is handled uniformly
    let next = (base + 1) % capacity;
    for (i, o) in out.iter_mut().enumerate() {
        let a = buffer[(base + i) % capacity];
        let b = buffer[(next + i) % capacity];
        *o = a + (b - a) * frac;
    }
}

fn copy_wrapped(buffer: &[f32], start: usize, out: &mut [f32]) {
    let capacity = buffer.len();
    let mut pos = start;
    let mut filled = 0;
    while filled < out.len() {
        let n = (capacity - pos).min(out.len() - filled);
        out[filled..filled + n].copy_from_slice(&buffer[pos..pos + n]);
        filled += n;
        pos = 0;
    }
}
