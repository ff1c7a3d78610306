//! Turning sensor distances into effect parameters.

/*
Distance Mapping
================

Each sensor reports the distance to the player's hand in meters. A mapping
turns that into a parameter value.

Linear
------

    t     = (distance - dist_min) / (dist_max - dist_min)
    value = val_min + t · (val_max - val_min)

Logarithmic
-----------

Equal hand movements give equal *ratios* of the parameter instead of equal
steps, which suits quantities heard on a log scale (time, frequency):

    value = exp(ln val_min + t · (ln val_max - ln val_min))

Both bounds must be strictly positive.

Both curves clamp the result into [val_min, val_max], so a hand closer than
`dist_min` or further than `dist_max` pins the parameter to its end.

Invert
------

With `invert` the range is mirrored: the nearest hand position yields
`val_max`. The distortion sensor works this way (move closer to distort
harder).

Hysteresis
----------

Ultrasonic readings jitter by a centimetre or two. A channel only commits a
new distance when it differs from the last committed one by more than a
tolerance, so a still hand does not keep rewriting the delay time (and
retriggering its crossfade).
*/

use crate::config::{MappingCurve, SensorMapping};

/// Map `distance` linearly onto `[val_min, val_max]`, clamped.
pub fn linear_scale(distance: f32, dist_min: f32, dist_max: f32, val_min: f32, val_max: f32) -> f32 {
    let t = unit_position(distance, dist_min, dist_max);
    clamp_between(val_min + t * (val_max - val_min), val_min, val_max)
}

/// Map `distance` exponentially onto `[val_min, val_max]`, clamped. Both
/// bounds must be positive; otherwise `val_min` is returned.
pub fn log_scale(distance: f32, dist_min: f32, dist_max: f32, val_min: f32, val_max: f32) -> f32 {
    if val_min <= 0.0 || val_max <= 0.0 {
        return val_min;
    }
    let t = unit_position(distance, dist_min, dist_max);
    let (lo, hi) = (val_min.ln(), val_max.ln());
    clamp_between((lo + t * (hi - lo)).exp(), val_min, val_max)
}

/// Unclamped position of `distance` inside the distance range. The value
/// clamp happens afterwards, once, on the mapped result.
#[inline]
fn unit_position(distance: f32, dist_min: f32, dist_max: f32) -> f32 {
    let span = dist_max - dist_min;
    if !distance.is_finite() || span == 0.0 {
        return 0.0;
    }
    (distance - dist_min) / span
}

#[inline]
fn clamp_between(value: f32, a: f32, b: f32) -> f32 {
    value.clamp(a.min(b), a.max(b))
}

/// A configured distance → value mapping for one sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeMapping {
    pub dist_min: f32,
    pub dist_max: f32,
    pub val_min: f32,
    pub val_max: f32,
    pub invert: bool,
    pub curve: MappingCurve,
}

impl RangeMapping {
    pub fn new(dist_min: f32, dist_max: f32, val_min: f32, val_max: f32) -> Self {
        Self {
            dist_min,
            dist_max,
            val_min,
            val_max,
            invert: false,
            curve: MappingCurve::Linear,
        }
    }

    /// Build from a sensor's configuration and the parameter range it drives.
    pub fn from_config(config: &SensorMapping, val_min: f32, val_max: f32) -> Self {
        Self {
            dist_min: config.dist_min,
            dist_max: config.dist_max,
            val_min,
            val_max,
            invert: config.invert,
            curve: config.curve,
        }
    }

    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }

    pub fn with_curve(mut self, curve: MappingCurve) -> Self {
        self.curve = curve;
        self
    }

    pub fn map(&self, distance: f32) -> f32 {
        // Inverting mirrors the distance, not the value, so a log curve
        // keeps its shape
        let distance = if self.invert {
            self.dist_max - (distance - self.dist_min)
        } else {
            distance
        };

        match self.curve {
            MappingCurve::Linear => {
                linear_scale(distance, self.dist_min, self.dist_max, self.val_min, self.val_max)
            }
            MappingCurve::Logarithmic => {
                log_scale(distance, self.dist_min, self.dist_max, self.val_min, self.val_max)
            }
        }
    }
}

/// Deadband on a stream of distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hysteresis {
    tolerance: f32,
    committed: f32,
}

impl Hysteresis {
    pub fn new(tolerance: f32, initial: f32) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
            committed: initial,
        }
    }

    pub fn committed(&self) -> f32 {
        self.committed
    }

    /// Commit `value` if it moved more than the tolerance. Returns whether it
    /// was committed.
    pub fn update(&mut self, value: f32) -> bool {
        if (value - self.committed).abs() > self.tolerance {
            self.committed = value;
            true
        } else {
            false
        }
    }

    /// Commit `value` unconditionally.
    pub fn force(&mut self, value: f32) {
        self.committed = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_scale_endpoints() {
        assert_eq!(linear_scale(0.0, 0.0, 0.35, 0.0, 0.8), 0.0);
        assert!((linear_scale(0.35, 0.0, 0.35, 0.0, 0.8) - 0.8).abs() < 1e-6);
        assert!((linear_scale(0.175, 0.0, 0.35, 0.0, 0.8) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_linear_scale_clamps_outside_range() {
        assert_eq!(linear_scale(-1.0, 0.0, 0.35, 0.0, 0.8), 0.0);
        assert_eq!(linear_scale(10.0, 0.0, 0.35, 0.0, 0.8), 0.8);
        // Descending value range clamps the same way
        assert_eq!(linear_scale(10.0, 0.0, 0.35, 0.8, 0.0), 0.0);
    }

    #[test]
    fn test_linear_scale_is_monotonic() {
        let mut previous = f32::MIN;
        for i in 0..=100 {
            let d = i as f32 * 0.005;
            let v = linear_scale(d, 0.0, 0.35, 0.0, 17_640.0);
            assert!(v >= previous);
            previous = v;
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(linear_scale(0.2, 0.3, 0.3, 1.0, 2.0), 1.0);
        assert_eq!(linear_scale(f32::NAN, 0.0, 0.35, 1.0, 2.0), 1.0);
        assert_eq!(log_scale(0.2, 0.0, 0.35, 0.0, 2.0), 0.0);
    }

    #[test]
    fn test_log_scale_geometric_midpoint() {
        // Halfway between 0.01 and 1.0 on a log axis is 0.1
        let mid = log_scale(0.5, 0.0, 1.0, 0.01, 1.0);
        assert!((mid - 0.1).abs() < 1e-5);
        assert!((log_scale(0.0, 0.0, 1.0, 0.01, 1.0) - 0.01).abs() < 1e-7);
        assert!((log_scale(2.0, 0.0, 1.0, 0.01, 1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_inverted_mapping() {
        let mapping = RangeMapping::new(0.0, 0.35, 0.0, 0.8).inverted();
        assert!((mapping.map(0.0) - 0.8).abs() < 1e-6);
        assert!(mapping.map(0.35).abs() < 1e-6);
        assert!(mapping.map(0.1) > mapping.map(0.2));
    }

    #[test]
    fn test_inverted_log_mapping_stays_in_range() {
        let mapping = RangeMapping::new(0.05, 0.35, 0.01, 0.4)
            .with_curve(MappingCurve::Logarithmic)
            .inverted();
        assert!((mapping.map(0.05) - 0.4).abs() < 1e-6);
        assert!((mapping.map(0.35) - 0.01).abs() < 1e-6);
        assert!((mapping.map(1.0) - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_hysteresis_suppresses_small_moves() {
        let mut gate = Hysteresis::new(0.03, 0.35);
        assert!(!gate.update(0.33));
        assert!(!gate.update(0.37));
        assert_eq!(gate.committed(), 0.35);

        assert!(gate.update(0.30));
        assert_eq!(gate.committed(), 0.30);

        // Tolerance is measured from the committed value, so slow drift still
        // needs a full tolerance step
        assert!(!gate.update(0.28));
        assert!(!gate.update(0.275));
        assert!(gate.update(0.26));
    }

    #[test]
    fn test_hysteresis_force() {
        let mut gate = Hysteresis::new(0.5, 0.0);
        gate.force(0.1);
        assert_eq!(gate.committed(), 0.1);
    }
}
