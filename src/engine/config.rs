#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{synth::params::SynthParameters, Error, Result, MAX_BLOCK_SIZE};

/// Largest sample rate the reverb's delay lines are sized for.
pub const MAX_SAMPLE_RATE: f32 = 192_000.0;

/// Everything needed to build an [`Engine`](crate::engine::Engine).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Size of the voice pool.
    pub voices: usize,
    pub sample_rate: f32,
    /// Largest block `render_block` will ever be asked for.
    pub max_block_size: usize,
    /// 1 (mono) or 2 (stereo).
    pub channels: usize,
    /// Capacity of the control-thread note queue.
    pub queue_capacity: usize,
    /// Most note events sorted per block; extra events are applied in
    /// arrival order after the sorted ones.
    pub max_events_per_block: usize,
    pub params: SynthParameters,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            voices: 8,
            sample_rate: 48_000.0,
            max_block_size: MAX_BLOCK_SIZE,
            channels: 2,
            queue_capacity: 256,
            max_events_per_block: 512,
            params: SynthParameters::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_voices(mut self, voices: usize) -> Self {
        self.voices = voices;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_max_block_size(mut self, max_block_size: usize) -> Self {
        self.max_block_size = max_block_size;
        self
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_params(mut self, params: SynthParameters) -> Self {
        self.params = params;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.voices == 0 {
            return Err(Error::InvalidConfig("voice pool needs at least one voice".into()));
        }
        validate_stream(self.sample_rate, self.max_block_size, self.channels)?;
        if self.queue_capacity == 0 {
            return Err(Error::InvalidConfig("note queue capacity must be non-zero".into()));
        }
        Ok(())
    }
}

/// Checks shared by construction and `prepare`.
pub(crate) fn validate_stream(sample_rate: f32, max_block_size: usize, channels: usize) -> Result<()> {
    if !(sample_rate.is_finite() && sample_rate > 0.0 && sample_rate <= MAX_SAMPLE_RATE) {
        return Err(Error::InvalidConfig(format!(
            "sample rate {sample_rate} outside (0, {MAX_SAMPLE_RATE}]"
        )));
    }
    if max_block_size == 0 {
        return Err(Error::InvalidConfig("max block size must be non-zero".into()));
    }
    if !(1..=2).contains(&channels) {
        return Err(Error::InvalidConfig(format!(
            "{channels} output channels requested, only mono or stereo is supported"
        )));
    }
    Ok(())
}
