use crate::control::EffectParameters;
use crate::graph::node::EffectNode;

/*
Effect Chain
============

An EffectChain runs a list of stages in series over the same buffer. Each
stage processes the block in place and hands it to the next one:

  input ──→ [trim] ──→ [delay] ──→ [distortion] ──→ [lowpass] ──→ output

Order matters. Distorting after the delay means the echoes are distorted
along with the dry signal; the low-pass last smooths the harmonics the
waveshaper adds.

Building a chain:

  let chain = EffectChain::new()
      .through(GainNode::new(1.0))
      .through(DelayNode::new(capacity, 0.4))
      .through(DistortionNode::default())
      .through(FilterNode::lowpass(2, 0.02));

Parameters fan out: `set_params` passes the same snapshot to every stage and
each one picks the fields it cares about. Stages are boxed so a chain can
hold any mix of them; the boxes are created once, at build time, never on
the audio thread.
*/

#[derive(Default)]
pub struct EffectChain {
    stages: Vec<Box<dyn EffectNode>>,
}

impl EffectChain {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage, builder style.
    pub fn through<N: EffectNode + 'static>(mut self, node: N) -> Self {
        self.push(node);
        self
    }

    pub fn push<N: EffectNode + 'static>(&mut self, node: N) {
        self.stages.push(Box::new(node));
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in processing order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|stage| stage.name())
    }
}

impl EffectNode for EffectChain {
    fn render_block(&mut self, block: &mut [f32]) {
        for stage in self.stages.iter_mut() {
            stage.render_block(block);
        }
    }

    fn set_params(&mut self, params: &EffectParameters) {
        for stage in self.stages.iter_mut() {
            stage.set_params(params);
        }
    }

    fn reset(&mut self) {
        for stage in self.stages.iter_mut() {
            stage.reset();
        }
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}
