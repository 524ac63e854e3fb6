use crate::{
    dsp::reverb::StereoReverb,
    synth::{params::EffectParameters, pool::VoicePool},
};

/// Delay lines cleared per block while a bypassed reverb drops its tail.
const CLEAR_FILTERS_PER_BLOCK: usize = 4;

/// Sums the voice pool into the output and runs the shared reverb over it.
///
/// Voices render mono. For stereo output the mono sum is copied to both
/// channels before the reverb spreads the wet signal across them.
///
/// Bypassing the reverb starts clearing its tail a few delay lines per
/// block, so switching it back on never replays stale sound. Blocks rendered
/// while a clear is still pending pass through dry.
pub struct Mixer {
    reverb: StereoReverb,
    effect: EffectParameters,
}

impl Mixer {
    pub fn new(sample_rate: f32, effect: &EffectParameters) -> Self {
        let mut mixer = Self {
            reverb: StereoReverb::new(sample_rate),
            effect: *effect,
        };
        mixer.push_reverb_settings();
        mixer.reverb.reset();
        mixer
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        self.reverb.configure(sample_rate);
        self.reverb.reset();
    }

    /// Hand new reverb settings to the effect.
    pub fn apply_reverb_parameters(&mut self, params: &EffectParameters) {
        if self.effect == *params {
            return;
        }
        let bypassed = !params.enabled && self.effect.enabled;
        self.effect = *params;
        self.push_reverb_settings();
        if bypassed {
            self.reverb.begin_clear();
        }
    }

    /// Advance any pending clear; true when the reverb should run this block.
    fn reverb_ready(&mut self) -> bool {
        if self.reverb.is_clearing() {
            self.reverb.clear_step(CLEAR_FILTERS_PER_BLOCK);
        }
        self.effect.enabled && !self.reverb.is_clearing()
    }

    fn push_reverb_settings(&mut self) {
        let p = &self.effect;
        self.reverb.set_room_size(p.room_size);
        self.reverb.set_damping(p.damping);
        self.reverb.set_wet_level(p.wet_level);
        self.reverb.set_dry_level(p.dry_level);
        self.reverb.set_width(p.width);
        self.reverb.set_freeze(p.freeze);
    }

    /// Mono render: zero, sum every voice, then reverb in place if enabled.
    pub fn mix(&mut self, pool: &mut VoicePool, out: &mut [f32]) {
        out.fill(0.0);
        pool.render_into(out);

        if self.reverb_ready() {
            self.reverb.process_mono(out);
        }
    }

    /// Stereo render. Unequal buffers render their common length and the
    /// excess of the longer one is zeroed.
    pub fn mix_stereo(&mut self, pool: &mut VoicePool, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len().min(right.len());
        left[frames..].fill(0.0);
        right[frames..].fill(0.0);
        let (left, right) = (&mut left[..frames], &mut right[..frames]);

        left.fill(0.0);
        pool.render_into(left);
        right.copy_from_slice(left);

        if self.reverb_ready() {
            self.reverb.process_stereo(left, right);
        }
    }

    /// Drop the reverb tail.
    pub fn reset(&mut self) {
        self.reverb.reset();
    }

    pub fn effect_parameters(&self) -> &EffectParameters {
        &self.effect
    }
}
