use crate::control::EffectParameters;
use crate::dsp::distortion::Distortion;
use crate::graph::node::EffectNode;

/// Sensor-driven waveshaper on normalized samples.
#[derive(Default)]
pub struct DistortionNode {
    shaper: Distortion,
}

impl DistortionNode {
    pub fn new(amount: f32) -> Self {
        Self {
            shaper: Distortion::new(amount),
        }
    }

    pub fn amount(&self) -> f32 {
        self.shaper.amount()
    }
}

impl EffectNode for DistortionNode {
    fn render_block(&mut self, block: &mut [f32]) {
        self.shaper.apply_buffer(block);
    }

    fn set_params(&mut self, params: &EffectParameters) {
        self.shaper.set_amount(params.distortion_amount);
    }

    fn name(&self) -> &'static str {
        "distortion"
    }
}
