//! Parameter groups shared between the control surface and the render thread.
//!
//! Each group is a small `Copy` value. The control side builds a new value,
//! clamps it, and publishes it wholesale (see [`crate::synth::shared`]); the
//! render side reads one copy per block. Nothing here is ever mutated field
//! by field from another thread.

use crate::dsp::oscillator::OscillatorWaveform;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Longest attack/decay/release the control surface can request, in seconds.
pub const MAX_STAGE_SECONDS: f32 = 5.0;

/// Clamp `value` into `[min, max]`, replacing NaN/inf with `fallback`.
#[inline]
fn sanitize(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorParameters {
    /// Linear output gain per voice, 0.0 - 1.0.
    pub volume: f32,
    pub waveform: OscillatorWaveform,
}

impl Default for OscillatorParameters {
    fn default() -> Self {
        Self {
            volume: 0.5,
            waveform: OscillatorWaveform::Sine,
        }
    }
}

impl OscillatorParameters {
    pub fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            volume: sanitize(self.volume, 0.0, 1.0, d.volume),
            waveform: self.waveform,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParameters {
    /// Seconds.
    pub attack: f32,
    /// Seconds.
    pub decay: f32,
    /// Level, 0.0 - 1.0.
    pub sustain: f32,
    /// Seconds.
    pub release: f32,
}

impl Default for EnvelopeParameters {
    fn default() -> Self {
        Self {
            attack: 0.1,
            decay: 0.1,
            sustain: 1.0,
            release: 0.4,
        }
    }
}

impl EnvelopeParameters {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// Times are clamped to `[0, MAX_STAGE_SECONDS]`; the envelope itself
    /// enforces a one-sample minimum.
    pub fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            attack: sanitize(self.attack, 0.0, MAX_STAGE_SECONDS, d.attack),
            decay: sanitize(self.decay, 0.0, MAX_STAGE_SECONDS, d.decay),
            sustain: sanitize(self.sustain, 0.0, 1.0, d.sustain),
            release: sanitize(self.release, 0.0, MAX_STAGE_SECONDS, d.release),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParameters {
    pub room_size: f32,
    pub damping: f32,
    pub wet_level: f32,
    pub dry_level: f32,
    pub width: f32,
    pub freeze: f32,
    pub enabled: bool,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            room_size: 0.5,
            damping: 0.5,
            wet_level: 0.3,
            dry_level: 0.7,
            width: 1.0,
            freeze: 0.0,
            enabled: true,
        }
    }
}

impl EffectParameters {
    pub fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            room_size: sanitize(self.room_size, 0.0, 1.0, d.room_size),
            damping: sanitize(self.damping, 0.0, 1.0, d.damping),
            wet_level: sanitize(self.wet_level, 0.0, 1.0, d.wet_level),
            dry_level: sanitize(self.dry_level, 0.0, 1.0, d.dry_level),
            width: sanitize(self.width, 0.0, 1.0, d.width),
            freeze: sanitize(self.freeze, 0.0, 1.0, d.freeze),
            enabled: self.enabled,
        }
    }

    /// Same levels with the effect switched off.
    pub fn bypassed(self) -> Self {
        Self {
            enabled: false,
            ..self
        }
    }
}

/// Every control the engine exposes, grouped the way it is published.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SynthParameters {
    pub oscillator: OscillatorParameters,
    pub envelope: EnvelopeParameters,
    pub effect: EffectParameters,
}

impl SynthParameters {
    pub fn clamped(self) -> Self {
        Self {
            oscillator: self.oscillator.clamped(),
            envelope: self.envelope.clamped(),
            effect: self.effect.clamped(),
        }
    }
}
