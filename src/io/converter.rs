/// Magnitude of a full-scale 16-bit sample. Normalized `f32` samples are
/// scaled by this value at the fixed-point boundary.
pub const I16_FULL_SCALE: f32 = i16::MAX as f32;

/// Convert fixed-point samples to normalized floats.
pub fn i16_to_f32(input: &[i16], output: &mut [f32]) {
    debug_assert_eq!(input.len(), output.len());
    for (o, &s) in output.iter_mut().zip(input.iter()) {
        *o = s as f32 / I16_FULL_SCALE;
    }
}

/// Convert normalized floats back to fixed point, rounding to the nearest
/// step and saturating anything outside `[-1, 1]`.
pub fn f32_to_i16(input: &[f32], output: &mut [i16]) {
    debug_assert_eq!(input.len(), output.len());
    for (o, &s) in output.iter_mut().zip(input.iter()) {
        // `as` saturates and maps NaN to 0
        *o = (s * I16_FULL_SCALE).round() as i16;
    }
}

/// Copy channel `channel` of an interleaved buffer into `out`, one sample per
/// frame.
pub fn deinterleave_channel(interleaved: &[f32], channels: usize, channel: usize, out: &mut [f32]) {
    debug_assert!(channel < channels);
    for (o, frame) in out.iter_mut().zip(interleaved.chunks_exact(channels)) {
        *o = frame[channel];
    }
}

/// Write `src` back into channel `channel` of an interleaved buffer.
pub fn interleave_channel(src: &[f32], channels: usize, channel: usize, interleaved: &mut [f32]) {
    debug_assert!(channel < channels);
    for (&s, frame) in src.iter().zip(interleaved.chunks_exact_mut(channels)) {
        frame[channel] = s;
    }
}
