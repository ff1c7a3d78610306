use crate::config::LowpassConfig;
use crate::dsp::filter::LowpassFilter;
use crate::graph::node::EffectNode;

/// Fixed Butterworth low-pass closing the chain. Not sensor-driven.
pub struct FilterNode {
    filter: LowpassFilter,
}

impl FilterNode {
    pub fn lowpass(order: usize, cutoff: f32) -> Self {
        Self {
            filter: LowpassFilter::butterworth(order, cutoff),
        }
    }

    pub fn from_config(config: &LowpassConfig) -> Self {
        Self::lowpass(config.order, config.cutoff)
    }

    pub fn filter(&self) -> &LowpassFilter {
        &self.filter
    }
}

impl EffectNode for FilterNode {
    fn render_block(&mut self, block: &mut [f32]) {
        self.filter.process(block);
    }

    fn reset(&mut self) {
        self.filter.reset();
    }

    fn name(&self) -> &'static str {
        "lowpass"
    }
}
