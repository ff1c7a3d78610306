//! Crossfade primitives.

/*
Crossfading
===========

A crossfade hands a signal path over to another one by blending them with
complementary weights. As one fades out, the other fades in.

Vocabulary
----------

  fade-out ramp   Weight applied to the outgoing signal, 1.0 → 0.0.
  fade-in ramp    Weight applied to the incoming signal, 0.0 → 1.0.
  position (t)    Where we are inside the fade, 0.0 at the first sample
                  and 1.0 at the last.


The Math: Linear Crossfade
--------------------------

For each sample i of a fade that spans `len` samples:

    t      = i / (len - 1)
    output = outgoing × (1 - t) + incoming × t

The weights always sum to 1.0. When both paths carry the same material
(which is the case for a delay line switching between two read offsets of
the same history) there is no level dip in the middle of the fade.

    weight
      1.0 ──╲                ╱──
              ╲            ╱
               ╲  out  in ╱
                 ╲      ╱
                   ╲  ╱
      0.5           ╳
                   ╱  ╲
      0.0 ──────╱        ╲──────
           first        last sample

A one-sample fade has no room for a ramp and jumps straight to the incoming
path (t = 1.0).


Segmented Fades
---------------

Callers that process a block in several pieces pass the offset of the piece
inside the block together with the block length, so the ramp stays a single
straight line across the whole block.
*/

/// Position of sample `index` inside a linear fade spanning `len` samples.
///
/// Returns 0.0 for the first sample and 1.0 for the last one.
#[inline]
pub fn ramp_position(index: usize, len: usize) -> f32 {
    if len <= 1 {
        1.0
    } else {
        index as f32 / (len - 1) as f32
    }
}

/// Blend a single pair of samples. `t = 0` is all `outgoing`, `t = 1` all
/// `incoming`.
#[inline]
pub fn crossfade_sample(outgoing: f32, incoming: f32, t: f32) -> f32 {
    outgoing * (1.0 - t) + incoming * t
}

/// Crossfade two buffers into `out`.
///
/// `offset` is the index of `out[0]` inside a fade spanning `total` samples.
#[inline]
pub fn crossfade(outgoing: &[f32], incoming: &[f32], offset: usize, total: usize, out: &mut [f32]) {
    debug_assert_eq!(outgoing.len(), incoming.len());
    debug_assert_eq!(outgoing.len(), out.len());
    debug_assert!(offset + out.len() <= total.max(1));

    for (i, ((o, &a), &b)) in out
        .iter_mut()
        .zip(outgoing.iter())
        .zip(incoming.iter())
        .enumerate()
    {
        *o = crossfade_sample(a, b, ramp_position(offset + i, total));
    }
}
