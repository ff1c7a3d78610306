//! Gain scaling primitive.

/*
Gain
====

    output[i] = input[i] × gain

  gain > 1.0  →  louder
  gain = 1.0  →  unchanged (unity)
  gain < 1.0  →  quieter
  gain = 0.0  →  silence

In decibels: dB = 20 × log₁₀(gain). Every halving of amplitude is about
-6 dB. A trim stage ahead of the delay keeps hot inputs from piling up in
the feedback loop before the waveshaper gets to them.
*/

/// Multiply a signal by a constant gain factor (in-place).
///
/// Unity gain leaves the buffer untouched.
#[inline]
pub fn apply_gain(signal: &mut [f32], gain: f32) {
    if gain == 1.0 {
        return;
    }
    for sample in signal.iter_mut() {
        *sample *= gain;
    }
}
