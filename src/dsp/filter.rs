use std::f64::consts::PI;

/*
Butterworth Low-Pass as Second-Order Sections
=============================================

A Butterworth filter is maximally flat in the passband: no ripple, -3 dB at
the cutoff, then rolling off at 6 dB/octave per pole.

  order | roll-off      | sections
  ----- | ------------- | -------------------------
  1     | 6 dB/octave   | one first-order
  2     | 12 dB/octave  | one biquad
  3     | 18 dB/octave  | one biquad + one first-order
  4     | 24 dB/octave  | two biquads

High-order IIR filters are numerically fragile as one big polynomial, so the
filter is split into a cascade of second-order sections (SOS). Each section
is a biquad with its own two-sample memory, and the output of one feeds the
next.


Section design
--------------

The analog Butterworth poles sit on a circle. Pairing conjugate poles gives
one biquad per pair with quality factor

    Q_k = 1 / (2 · sin((2k + 1) · π / (2N)))      k = 0 .. N/2

Each biquad is the bilinear transform of an analog 2-pole low-pass, with the
cutoff prewarped so the digital -3 dB point lands exactly on `cutoff`:

    w0    = π · cutoff            (cutoff normalized, 1.0 = Nyquist)
    alpha = sin(w0) / (2 · Q)

    b0 = (1 - cos w0) / 2     a0 = 1 + alpha
    b1 =  1 - cos w0          a1 = -2 · cos w0
    b2 = (1 - cos w0) / 2     a2 = 1 - alpha

An odd order leaves the real pole on its own, handled by a first-order
section with K = tan(w0 / 2):

    b0 = b1 = K / (1 + K)     a1 = (K - 1) / (K + 1)


Streaming
---------

Sections run in transposed direct form II. The two state values (z1, z2) per
section carry over between calls, so splitting a signal into blocks of any
size produces the same output as filtering it in one go. Coefficients and
state are f64: very low cutoffs put the poles close to the unit circle where
f32 rounding becomes audible.
*/

/// One second-order section, coefficients normalized so `a0 = 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Biquad {
    /// Two-pole low-pass at angular frequency `w0` (radians per sample).
    pub fn lowpass(w0: f64, q: f64) -> Self {
        let cos = w0.cos();
        let alpha = w0.sin() / (2.0 * q);
        let a0 = 1.0 + alpha;

        Self {
            b0: (1.0 - cos) / 2.0 / a0,
            b1: (1.0 - cos) / a0,
            b2: (1.0 - cos) / 2.0 / a0,
            a1: -2.0 * cos / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    /// One-pole low-pass, stored as a biquad with zeroed second-order terms.
    pub fn first_order_lowpass(w0: f64) -> Self {
        let k = (w0 / 2.0).tan();
        Self {
            b0: k / (1.0 + k),
            b1: k / (1.0 + k),
            b2: 0.0,
            a1: (k - 1.0) / (k + 1.0),
            a2: 0.0,
        }
    }

    #[inline]
    pub fn process_sample(&self, x: f64, state: &mut [f64; 2]) -> f64 {
        let y = self.b0 * x + state[0];
        state[0] = self.b1 * x - self.a1 * y + state[1];
        state[1] = self.b2 * x - self.a2 * y;
        y
    }

    /// Magnitude response at angular frequency `w` (radians per sample).
    pub fn magnitude(&self, w: f64) -> f64 {
        // H(e^jw) = (b0 + b1 e^-jw + b2 e^-2jw) / (1 + a1 e^-jw + a2 e^-2jw)
        let (c1, s1) = (w.cos(), -w.sin());
        let (c2, s2) = ((2.0 * w).cos(), -(2.0 * w).sin());

        let num_re = self.b0 + self.b1 * c1 + self.b2 * c2;
        let num_im = self.b1 * s1 + self.b2 * s2;
        let den_re = 1.0 + self.a1 * c1 + self.a2 * c2;
        let den_im = self.a1 * s1 + self.a2 * s2;

        (num_re.hypot(num_im)) / (den_re.hypot(den_im))
    }
}

pub struct LowpassFilter {
    sections: Vec<Biquad>,
    state: Vec<[f64; 2]>,
    order: usize,
    cutoff: f32,
}

impl LowpassFilter {
    /// Design an `order`-pole Butterworth low-pass.
    ///
    /// `cutoff` is a fraction of Nyquist and is clamped into `(0, 1)`; order
    /// is at least 1.
    pub fn butterworth(order: usize, cutoff: f32) -> Self {
        let order = order.max(1);
        let cutoff = if cutoff.is_finite() {
            cutoff.clamp(1e-6, 0.999_999)
        } else {
            0.5
        };
        let w0 = PI * cutoff as f64;

        let mut sections: Vec<Biquad> = (0..order / 2)
            .map(|k| {
                let theta = (2 * k + 1) as f64 * PI / (2 * order) as f64;
                Biquad::lowpass(w0, 1.0 / (2.0 * theta.sin()))
            })
            .collect();
        if order % 2 == 1 {
            sections.push(Biquad::first_order_lowpass(w0));
        }

        let state = vec![[0.0; 2]; sections.len()];
        Self {
            sections,
            state,
            order,
            cutoff,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Combined magnitude response of the cascade at normalized frequency
    /// `freq` (1.0 = Nyquist).
    pub fn magnitude(&self, freq: f32) -> f64 {
        let w = PI * freq as f64;
        self.sections.iter().map(|s| s.magnitude(w)).product()
    }

    /// Filter a block in place, continuing from the previous call's state.
    pub fn process(&mut self, block: &mut [f32]) {
        for sample in block.iter_mut() {
            let mut x = *sample as f64;
            for (section, state) in self.sections.iter().zip(self.state.iter_mut()) {
                x = section.process_sample(x, state);
            }
            *sample = x as f32;
        }
    }

    pub fn reset(&mut self) {
        self.state.fill([0.0; 2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(len: usize, freq: f32) -> Vec<f32> {
        // freq normalized to Nyquist
        (0..len)
            .map(|n| (std::f32::consts::PI * freq * n as f32).sin())
            .collect()
    }

    fn peak_after(buffer: &[f32], skip: usize) -> f32 {
        buffer[skip..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn test_section_count_follows_order() {
        assert_eq!(LowpassFilter::butterworth(1, 0.1).sections().len(), 1);
        assert_eq!(LowpassFilter::butterworth(2, 0.1).sections().len(), 1);
        assert_eq!(LowpassFilter::butterworth(3, 0.1).sections().len(), 2);
        assert_eq!(LowpassFilter::butterworth(4, 0.1).sections().len(), 2);
        assert_eq!(LowpassFilter::butterworth(0, 0.1).order(), 1);
    }

    #[test]
    fn test_unity_gain_at_dc() {
        for order in 1..=6 {
            let filter = LowpassFilter::butterworth(order, 0.02);
            assert!((filter.magnitude(0.0) - 1.0).abs() < 1e-9, "order {order}");
        }
    }

    #[test]
    fn test_half_power_at_cutoff() {
        let expected = std::f64::consts::FRAC_1_SQRT_2;
        for order in 1..=6 {
            let filter = LowpassFilter::butterworth(order, 0.2);
            let gain = filter.magnitude(0.2);
            assert!((gain - expected).abs() < 1e-6, "order {order}: {gain}");
        }
    }

    #[test]
    fn test_nyquist_is_rejected() {
        let filter = LowpassFilter::butterworth(2, 0.02);
        assert!(filter.magnitude(1.0) < 1e-9);
    }

    #[test]
    fn test_roll_off_steepens_with_order() {
        let low = LowpassFilter::butterworth(2, 0.05);
        let high = LowpassFilter::butterworth(4, 0.05);
        assert!(high.magnitude(0.2) < low.magnitude(0.2) * 0.1);
    }

    #[test]
    fn test_constant_input_settles_to_input() {
        let mut filter = LowpassFilter::butterworth(2, 0.02);
        let mut buffer = vec![1.0f32; 4096];
        filter.process(&mut buffer);
        assert!((buffer[4095] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_attenuates_above_cutoff() {
        let mut filter = LowpassFilter::butterworth(2, 0.02);
        let mut passband = sine(4096, 0.002);
        filter.process(&mut passband);

        filter.reset();
        let mut stopband = sine(4096, 0.4);
        filter.process(&mut stopband);

        assert!(peak_after(&passband, 2048) > 0.9);
        assert!(peak_after(&stopband, 2048) < 0.01);
    }

    #[test]
    fn test_block_split_matches_single_call() {
        let input: Vec<f32> = (0..1000)
            .map(|n| ((n * 37) % 101) as f32 / 50.0 - 1.0)
            .collect();

        let mut whole = input.clone();
        LowpassFilter::butterworth(3, 0.1).process(&mut whole);

        let mut split = LowpassFilter::butterworth(3, 0.1);
        let mut pieces = Vec::new();
        for chunk in [&input[..1], &input[1..128], &input[128..129], &input[129..]] {
            let mut block = chunk.to_vec();
            split.process(&mut block);
            pieces.extend(block);
        }

        assert_eq!(whole, pieces);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut filter = LowpassFilter::butterworth(2, 0.1);
        let mut buffer = vec![1.0f32; 64];
        filter.process(&mut buffer);

        filter.reset();
        let mut silence = vec![0.0f32; 16];
        filter.process(&mut silence);
        assert!(silence.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_out_of_range_cutoff_is_clamped() {
        let filter = LowpassFilter::butterworth(2, 3.0);
        assert!(filter.cutoff() < 1.0);
        assert!(filter.magnitude(0.0).is_finite());
    }
}
