use crate::control::EffectParameters;

/// A stage of the effect chain.
///
/// Stages process mono blocks in place. Parameter changes arrive through
/// `set_params` between blocks, never during one.
pub trait EffectNode: Send {
    fn render_block(&mut self, block: &mut [f32]);

    /// Pick up new sensor-driven parameters.
    ///
    /// Default implementation does nothing (stages with fixed settings).
    fn set_params(&mut self, _params: &EffectParameters) {
        // Default: do nothing
    }

    /// Forget all signal history.
    fn reset(&mut self) {
        // Default: do nothing
    }

    /// Short label for logs and the status display.
    fn name(&self) -> &'static str;
}

/// Allow boxed nodes to be used as nodes (for dynamic dispatch)
impl EffectNode for Box<dyn EffectNode> {
    fn render_block(&mut self, block: &mut [f32]) {
        (**self).render_block(block)
    }

    fn set_params(&mut self, params: &EffectParameters) {
        (**self).set_params(params)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
