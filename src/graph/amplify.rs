use crate::dsp::amplify::apply_gain;
use crate::graph::node::EffectNode;

/// Fixed input trim ahead of the sensor-driven stages.
pub struct GainNode {
    gain: f32,
}

impl GainNode {
    pub fn new(gain: f32) -> Self {
        Self {
            gain: if gain.is_finite() { gain.max(0.0) } else { 1.0 },
        }
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }
}

impl EffectNode for GainNode {
    fn render_block(&mut self, block: &mut [f32]) {
        apply_gain(block, self.gain);
    }

    fn name(&self) -> &'static str {
        "trim"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::EffectParameters;

    #[test]
    fn test_scales_block() {
        let mut node = GainNode::new(0.5);
        let mut block = [1.0, -0.5];
        node.render_block(&mut block);
        assert_eq!(block, [0.5, -0.25]);
    }

    #[test]
    fn test_ignores_sensor_parameters() {
        let mut node = GainNode::new(2.0);
        node.set_params(&EffectParameters {
            distortion_amount: 0.5,
            delay_samples: 100.0,
            delay_gain: 0.5,
        });
        assert_eq!(node.gain(), 2.0);
    }

    #[test]
    fn test_invalid_gain_falls_back() {
        assert_eq!(GainNode::new(f32::NAN).gain(), 1.0);
        assert_eq!(GainNode::new(-3.0).gain(), 0.0);
    }
}
