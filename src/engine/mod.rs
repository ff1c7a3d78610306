//! The real-time processing entry point.
//!
//! [`AudioEngine`] is driven by the audio callback. Each call picks up the
//! newest parameter snapshot (without waiting), pushes it into the effect
//! chains if it changed, and runs every channel's chain over the block.
//!
//! Nothing on this path allocates, locks, sleeps or logs. All buffers are
//! sized at construction for [`MAX_BLOCK_SIZE`] frames; longer blocks are
//! processed in pieces.

use crate::config::EngineConfig;
use crate::control::{EffectParameters, SnapshotReader};
use crate::error::{Error, Result};
use crate::graph::{DelayNode, DistortionNode, EffectChain, EffectNode, FilterNode, GainNode};
use crate::io::{deinterleave_channel, f32_to_i16, i16_to_f32, interleave_channel};
use crate::{MAX_BLOCK_SIZE, MAX_CHANNELS};

/// Build the standard chain for one channel:
/// trim → delay → distortion → low-pass (if configured).
pub fn default_chain(config: &EngineConfig) -> EffectChain {
    let mut chain = EffectChain::new()
        .through(GainNode::new(config.trim_gain))
        .through(DelayNode::new(config.delay_capacity(), config.delay.feedback_gain))
        .through(DistortionNode::default());
    if let Some(lowpass) = &config.lowpass {
        chain.push(FilterNode::from_config(lowpass));
    }
    chain
}

pub struct AudioEngine {
    chains: Vec<EffectChain>,
    reader: SnapshotReader,
    params: EffectParameters,
    generation: u64,
    channels: usize,
    max_delay_samples: f32,
    // One channel's worth of de-interleaved frames
    channel_scratch: Vec<f32>,
    // Interleaved floats for the fixed-point entry point
    convert_scratch: Vec<f32>,
    blocks_processed: u64,
}

impl AudioEngine {
    /// Build an engine with the standard chain on every channel.
    pub fn new(config: &EngineConfig, reader: SnapshotReader) -> Result<Self> {
        config.validate()?;
        let chains = (0..config.channels).map(|_| default_chain(config)).collect();
        Self::with_chains(config, reader, chains)
    }

    /// Build an engine around caller-supplied chains, one per channel.
    pub fn with_chains(
        config: &EngineConfig,
        mut reader: SnapshotReader,
        mut chains: Vec<EffectChain>,
    ) -> Result<Self> {
        config.validate()?;
        if chains.len() != config.channels {
            return Err(Error::ChainCountMismatch {
                expected: config.channels,
                actual: chains.len(),
            });
        }

        let max_delay_samples = config.delay_capacity().saturating_sub(1) as f32;
        let snapshot = reader.read();
        let params = snapshot.params.sanitized(max_delay_samples);

        // The initial delay time takes effect immediately, without a fade
        for chain in chains.iter_mut() {
            chain.set_params(&params);
            chain.reset();
        }

        log::info!(
            "audio engine ready: {} Hz, {} channel(s), {}-frame blocks, stages [{}]",
            config.sample_rate,
            config.channels,
            config.block_size,
            chains
                .first()
                .map(|chain| chain.names().collect::<Vec<_>>().join(" → "))
                .unwrap_or_default()
        );

        Ok(Self {
            chains,
            reader,
            params,
            generation: snapshot.generation,
            channels: config.channels,
            max_delay_samples,
            channel_scratch: vec![0.0; MAX_BLOCK_SIZE],
            convert_scratch: vec![0.0; MAX_BLOCK_SIZE * MAX_CHANNELS],
            blocks_processed: 0,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Parameters currently applied to the chains.
    pub fn params(&self) -> EffectParameters {
        self.params
    }

    /// Generation of the snapshot the current parameters came from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn blocks_processed(&self) -> u64 {
        self.blocks_processed
    }

    pub fn chain(&self, channel: usize) -> Option<&EffectChain> {
        self.chains.get(channel)
    }

    /// Process normalized samples from `input` into `output`.
    ///
    /// Both buffers are interleaved when the engine has more than one
    /// channel. Only the common length is processed.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());
        let len = input.len().min(output.len());
        output[..len].copy_from_slice(&input[..len]);
        self.process_in_place(&mut output[..len]);
    }

    /// Process normalized samples in place.
    ///
    /// Blocks longer than [`MAX_BLOCK_SIZE`] frames run as consecutive
    /// sub-blocks. A delay change picked up for such a block crossfades over
    /// the first sub-block only; the remainder already runs at the new delay.
    pub fn process_in_place(&mut self, block: &mut [f32]) {
        self.refresh_params();
        let frame_len = MAX_BLOCK_SIZE * self.channels;
        for chunk in block.chunks_mut(frame_len) {
            self.render(chunk);
        }
        self.blocks_processed += 1;
    }

    /// Process 16-bit samples, converting to and from the normalized range at
    /// the boundary. Oversized blocks are split like in
    /// [`process_in_place`](Self::process_in_place).
    pub fn process_i16(&mut self, input: &[i16], output: &mut [i16]) {
        debug_assert_eq!(input.len(), output.len());
        self.refresh_params();

        let len = input.len().min(output.len());
        let frame_len = MAX_BLOCK_SIZE * self.channels;
        let mut start = 0;
        while start < len {
            let end = (start + frame_len).min(len);
            let n = end - start;

            // Take the scratch out so `render` can borrow self mutably
            let mut scratch = std::mem::take(&mut self.convert_scratch);
            i16_to_f32(&input[start..end], &mut scratch[..n]);
            self.render(&mut scratch[..n]);
            f32_to_i16(&scratch[..n], &mut output[start..end]);
            self.convert_scratch = scratch;

            start = end;
        }
        self.blocks_processed += 1;
    }

    /// Clear all signal history (delay buffers, filter state).
    pub fn reset(&mut self) {
        for chain in self.chains.iter_mut() {
            chain.reset();
        }
    }

    /// Pull the newest snapshot and hand it to the chains if it changed.
    fn refresh_params(&mut self) {
        let snapshot = self.reader.read();
        if snapshot.generation == self.generation {
            return;
        }
        self.generation = snapshot.generation;

        let params = snapshot.params.sanitized(self.max_delay_samples);
        if params == self.params {
            return;
        }
        self.params = params;
        for chain in self.chains.iter_mut() {
            chain.set_params(&params);
        }
    }

    /// Run at most `MAX_BLOCK_SIZE` frames through the chains.
    fn render(&mut self, block: &mut [f32]) {
        if self.channels == 1 {
            self.chains[0].render_block(block);
            return;
        }

        // A trailing partial frame is left untouched
        let frames = block.len() / self.channels;
        let whole = &mut block[..frames * self.channels];
        let scratch = &mut self.channel_scratch[..frames];
        for (channel, chain) in self.chains.iter_mut().enumerate() {
            deinterleave_channel(whole, self.channels, channel, scratch);
            chain.render_block(scratch);
            interleave_channel(scratch, self.channels, channel, whole);
        }
    }
}
