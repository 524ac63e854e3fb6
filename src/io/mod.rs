// Purpose - external interfaces, format conversions

pub mod converter;
pub mod midi;

/// Host-facing output: one buffer per channel, each at least as long as the
/// block being rendered.
#[derive(Debug, Default)]
pub struct AudioOutput {
    pub buffers: Vec<Vec<f32>>,
}

impl AudioOutput {
    /// Allocate `channels` zeroed buffers of `frames` samples.
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            buffers: vec![vec![0.0; frames]; channels],
        }
    }

    pub fn channels(&self) -> usize {
        self.buffers.len()
    }

    /// Frames available in every channel.
    pub fn frames(&self) -> usize {
        self.buffers.iter().map(Vec::len).min().unwrap_or(0)
    }

    /// Write interleaved frames into `dest` (e.g. a cpal callback buffer).
    pub fn interleave_into(&self, dest: &mut [f32], frames: usize) {
        let channels = self.channels();
        if channels == 0 {
            return;
        }
        for (i, frame) in dest.chunks_mut(channels).take(frames).enumerate() {
            for (ch, sample) in frame.iter_mut().enumerate() {
                *sample = self.buffers[ch][i];
            }
        }
    }
}
