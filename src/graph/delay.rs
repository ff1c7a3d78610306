use crate::control::EffectParameters;
use crate::dsp::delay::DelayLine;
use crate::graph::node::EffectNode;

/// Sensor-driven feedback echo.
pub struct DelayNode {
    line: DelayLine,
}

impl DelayNode {
    /// A delay line holding `capacity` samples, starting bypassed.
    pub fn new(capacity: usize, gain: f32) -> Self {
        Self {
            line: DelayLine::new(capacity, gain),
        }
    }

    pub fn line(&self) -> &DelayLine {
        &self.line
    }
}

impl EffectNode for DelayNode {
    fn render_block(&mut self, block: &mut [f32]) {
        self.line.process(block);
    }

    fn set_params(&mut self, params: &EffectParameters) {
        self.line.set_gain(params.delay_gain);
        // Arms a crossfade for the next block
        self.line.set_delay(params.delay_samples);
    }

    fn reset(&mut self) {
        self.line.reset();
    }

    fn name(&self) -> &'static str {
        "delay"
    }
}
