//! Flat key/value snapshot of the control surface, for hosts that persist
//! plugin state.
//!
//! Every field is optional on the way in. Apply rules:
//! - `volume` and `waveform` apply individually,
//! - the four envelope keys apply only as a complete set,
//! - reverb keys apply individually; older documents simply omit them.

use log::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::oscillator::OscillatorWaveform;
use crate::synth::params::EnvelopeParameters;
use crate::synth::shared::SharedParameters;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParameterSnapshot {
    pub volume: Option<f32>,
    pub waveform: Option<i32>,
    pub attack: Option<f32>,
    pub decay: Option<f32>,
    pub sustain: Option<f32>,
    pub release: Option<f32>,

    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub room_size: Option<f32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub damping: Option<f32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub wet_level: Option<f32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub dry_level: Option<f32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub width: Option<f32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub freeze: Option<f32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub reverb_enabled: Option<bool>,
}

impl ParameterSnapshot {
    fn touches_reverb(&self) -> bool {
        [
            self.room_size,
            self.damping,
            self.wet_level,
            self.dry_level,
            self.width,
            self.freeze,
        ]
        .iter()
        .any(Option::is_some)
            || self.reverb_enabled.is_some()
    }

    /// Drop the reverb keys, leaving the six core keys.
    pub fn without_reverb(self) -> Self {
        Self {
            room_size: None,
            damping: None,
            wet_level: None,
            dry_level: None,
            width: None,
            freeze: None,
            reverb_enabled: None,
            ..self
        }
    }
}

#[cfg(feature = "serde")]
impl ParameterSnapshot {
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(document: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(document)?)
    }
}

impl SharedParameters {
    /// Capture every control, reverb included.
    pub fn capture(&self) -> ParameterSnapshot {
        let params = self.snapshot();
        debug!("capturing parameter snapshot");

        ParameterSnapshot {
            volume: Some(params.oscillator.volume),
            waveform: Some(params.oscillator.waveform.index()),
            attack: Some(params.envelope.attack),
            decay: Some(params.envelope.decay),
            sustain: Some(params.envelope.sustain),
            release: Some(params.envelope.release),
            room_size: Some(params.effect.room_size),
            damping: Some(params.effect.damping),
            wet_level: Some(params.effect.wet_level),
            dry_level: Some(params.effect.dry_level),
            width: Some(params.effect.width),
            freeze: Some(params.effect.freeze),
            reverb_enabled: Some(params.effect.enabled),
        }
    }

    /// Apply whatever the snapshot carries. Values are clamped like any
    /// other control-surface input.
    pub fn apply(&self, snapshot: &ParameterSnapshot) {
        // Groups are merged inside rcu so a setter racing from another
        // control thread is never overwritten with a stale value
        if snapshot.volume.is_some() || snapshot.waveform.is_some() {
            self.update_oscillator(|oscillator| {
                if let Some(volume) = snapshot.volume {
                    oscillator.volume = volume;
                }
                if let Some(index) = snapshot.waveform {
                    oscillator.waveform = OscillatorWaveform::from_index(index);
                }
            });
        }

        match (
            snapshot.attack,
            snapshot.decay,
            snapshot.sustain,
            snapshot.release,
        ) {
            (Some(a), Some(d), Some(s), Some(r)) => {
                self.publish_envelope(EnvelopeParameters::new(a, d, s, r));
            }
            (None, None, None, None) => {}
            _ => info!("snapshot has an incomplete envelope, keeping current envelope"),
        }

        if snapshot.touches_reverb() {
            self.update_effect(|effect| {
                let fields = [
                    (snapshot.room_size, &mut effect.room_size),
                    (snapshot.damping, &mut effect.damping),
                    (snapshot.wet_level, &mut effect.wet_level),
                    (snapshot.dry_level, &mut effect.dry_level),
                    (snapshot.width, &mut effect.width),
                    (snapshot.freeze, &mut effect.freeze),
                ];
                for (value, slot) in fields {
                    if let Some(value) = value {
                        *slot = value;
                    }
                }
                if let Some(enabled) = snapshot.reverb_enabled {
                    effect.enabled = enabled;
                }
            });
        }

        debug!("applied parameter snapshot");
    }
}
