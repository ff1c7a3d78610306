//! Distortion / Waveshaping
//!
//! A waveshaper applies a memoryless transfer function to every sample. This
//! one uses the "amount" curve
//!
//! ```text
//!   f(s) = (1 + k) · s / (1 + k · |s|)      k = 2a / (1 - a)
//! ```
//!
//! where `a` is the distortion amount in `[0, 1)`.
//!
//! # Shape
//!
//!   a = 0      k = 0, f(s) = s (clean)
//!   a = 0.5    k = 2, gentle saturation, peaks still reach ±1
//!   a = 0.8    k = 8, obvious distortion
//!   a → 1      k → ∞, approaches a hard clip at ±1
//!
//! Unlike a plain soft clip `x / (1 + |x|)`, the `(1 + k)` term keeps
//! full-scale input at full-scale output for every amount, so turning the
//! amount up adds harmonics without changing the peak level.
//!
//! # Singularity
//!
//! `a = 1` divides by zero. The amount is clamped below 1 where sensor
//! readings are mapped to parameters; this stage only asserts it in debug
//! builds.
//!
//! # Scaling
//!
//! The curve is defined on `[-1, 1]`. Samples are divided by the stage's full
//! scale before shaping and multiplied back afterwards, so the same stage works
//! on normalized floats (full scale 1.0) or 16-bit magnitudes (32767).

/// Upper bound for the distortion amount. Keeps `k` finite.
pub const MAX_DISTORTION_AMOUNT: f32 = 0.999;

/// Drive coefficient `k` for a distortion amount.
#[inline]
pub fn drive_coefficient(amount: f32) -> f32 {
    2.0 * amount / (1.0 - amount)
}

/// Apply the transfer function to a normalized sample.
#[inline]
pub fn waveshape(sample: f32, k: f32) -> f32 {
    (1.0 + k) * sample / (1.0 + k * sample.abs())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distortion {
    amount: f32,
    k: f32,
    full_scale: f32,
}

impl Distortion {
    /// Create a waveshaper for normalized `[-1, 1]` samples.
    pub fn new(amount: f32) -> Self {
        debug_assert!(
            (0.0..1.0).contains(&amount),
            "distortion amount must be in [0, 1), got {amount}"
        );
        Self {
            amount,
            k: drive_coefficient(amount),
            full_scale: 1.0,
        }
    }

    /// Use a different maximum magnitude, e.g. `i16::MAX as f32`.
    pub fn with_full_scale(mut self, full_scale: f32) -> Self {
        self.full_scale = full_scale.max(f32::MIN_POSITIVE);
        self
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn set_amount(&mut self, amount: f32) {
        debug_assert!(
            (0.0..1.0).contains(&amount),
            "distortion amount must be in [0, 1), got {amount}"
        );
        self.amount = amount;
        self.k = drive_coefficient(amount);
    }

    /// Shape a single sample.
    #[inline]
    pub fn apply(&self, sample: f32) -> f32 {
        if self.k == 0.0 {
            return sample;
        }
        waveshape(sample / self.full_scale, self.k) * self.full_scale
    }

    /// Shape a whole buffer in place.
    pub fn apply_buffer(&self, buffer: &mut [f32]) {
        if self.k == 0.0 {
            return;
        }
        for sample in buffer.iter_mut() {
            *sample = waveshape(*sample / self.full_scale, self.k) * self.full_scale;
        }
    }
}

impl Default for Distortion {
    fn default() -> Self {
        Self::new(0.0)
    }
}
