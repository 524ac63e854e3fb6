//! Wait-free parameter publication between the control and render threads.
//!
//! Each parameter group lives in its own [`ArcSwap`] cell. Setters build a
//! complete new group value and swap it in wholesale, so the render thread
//! either sees the whole old group or the whole new one, never a mix. The
//! render thread copies every group out once at the start of a block and
//! uses those copies for every frame of that block.

use std::sync::Arc;

use arc_swap::ArcSwap;
use log::debug;

use crate::dsp::oscillator::OscillatorWaveform;
use crate::synth::params::{
    EffectParameters, EnvelopeParameters, OscillatorParameters, SynthParameters,
};

pub struct SharedParameters {
    oscillator: ArcSwap<OscillatorParameters>,
    envelope: ArcSwap<EnvelopeParameters>,
    effect: ArcSwap<EffectParameters>,
}

impl Default for SharedParameters {
    fn default() -> Self {
        Self::new(SynthParameters::default())
    }
}

impl SharedParameters {
    pub fn new(initial: SynthParameters) -> Self {
        let initial = initial.clamped();
        Self {
            oscillator: ArcSwap::from_pointee(initial.oscillator),
            envelope: ArcSwap::from_pointee(initial.envelope),
            effect: ArcSwap::from_pointee(initial.effect),
        }
    }

    /// Copy out every group. Called by the render thread once per block.
    pub fn snapshot(&self) -> SynthParameters {
        SynthParameters {
            oscillator: **self.oscillator.load(),
            envelope: **self.envelope.load(),
            effect: **self.effect.load(),
        }
    }

    pub fn oscillator(&self) -> OscillatorParameters {
        **self.oscillator.load()
    }

    pub fn envelope(&self) -> EnvelopeParameters {
        **self.envelope.load()
    }

    pub fn effect(&self) -> EffectParameters {
        **self.effect.load()
    }

    // Whole-group publication

    pub fn publish(&self, params: SynthParameters) {
        self.publish_oscillator(params.oscillator);
        self.publish_envelope(params.envelope);
        self.publish_effect(params.effect);
    }

    pub fn publish_oscillator(&self, params: OscillatorParameters) {
        let clamped = params.clamped();
        if clamped != params {
            debug!("oscillator parameters clamped: {params:?} -> {clamped:?}");
        }
        self.oscillator.store(Arc::new(clamped));
    }

    pub fn publish_envelope(&self, params: EnvelopeParameters) {
        let clamped = params.clamped();
        if clamped != params {
            debug!("envelope parameters clamped: {params:?} -> {clamped:?}");
        }
        self.envelope.store(Arc::new(clamped));
    }

    pub fn publish_effect(&self, params: EffectParameters) {
        let clamped = params.clamped();
        if clamped != params {
            debug!("reverb parameters clamped: {params:?} -> {clamped:?}");
        }
        self.effect.store(Arc::new(clamped));
    }

    // Read-modify-write helpers. `rcu` retries if another writer raced us,
    // so these are safe from any number of control threads.

    pub(crate) fn update_oscillator(&self, f: impl Fn(&mut OscillatorParameters)) {
        self.oscillator.rcu(|current| {
            let mut next = **current;
            f(&mut next);
            next.clamped()
        });
    }

    pub(crate) fn update_envelope(&self, f: impl Fn(&mut EnvelopeParameters)) {
        self.envelope.rcu(|current| {
            let mut next = **current;
            f(&mut next);
            next.clamped()
        });
    }

    pub(crate) fn update_effect(&self, f: impl Fn(&mut EffectParameters)) {
        self.effect.rcu(|current| {
            let mut next = **current;
            f(&mut next);
            next.clamped()
        });
    }

    // Control-surface setters

    pub fn set_volume(&self, volume: f32) {
        self.update_oscillator(|p| p.volume = volume);
    }

    /// Selector index 0..=3 (sine, square, saw, triangle); clamped.
    pub fn set_waveform_index(&self, index: i32) {
        if !(0..=3).contains(&index) {
            debug!("waveform index {index} out of range, clamping");
        }
        self.set_waveform(OscillatorWaveform::from_index(index));
    }

    pub fn set_waveform(&self, waveform: OscillatorWaveform) {
        self.update_oscillator(|p| p.waveform = waveform);
    }

    pub fn set_adsr(&self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.publish_envelope(EnvelopeParameters::new(attack, decay, sustain, release));
    }

    pub fn set_attack(&self, seconds: f32) {
        self.update_envelope(|p| p.attack = seconds);
    }

    pub fn set_decay(&self, seconds: f32) {
        self.update_envelope(|p| p.decay = seconds);
    }

    pub fn set_sustain(&self, level: f32) {
        self.update_envelope(|p| p.sustain = level);
    }

    pub fn set_release(&self, seconds: f32) {
        self.update_envelope(|p| p.release = seconds);
    }

    pub fn set_reverb(
        &self,
        room_size: f32,
        damping: f32,
        wet_level: f32,
        dry_level: f32,
        width: f32,
        freeze: f32,
    ) {
        self.update_effect(|p| {
            p.room_size = room_size;
            p.damping = damping;
            p.wet_level = wet_level;
            p.dry_level = dry_level;
            p.width = width;
            p.freeze = freeze;
        });
    }

    pub fn set_room_size(&self, value: f32) {
        self.update_effect(|p| p.room_size = value);
    }

    pub fn set_damping(&self, value: f32) {
        self.update_effect(|p| p.damping = value);
    }

    pub fn set_wet_level(&self, value: f32) {
        self.update_effect(|p| p.wet_level = value);
    }

    pub fn set_dry_level(&self, value: f32) {
        self.update_effect(|p| p.dry_level = value);
    }

    pub fn set_width(&self, value: f32) {
        self.update_effect(|p| p.width = value);
    }

    pub fn set_freeze(&self, value: f32) {
        self.update_effect(|p| p.freeze = value);
    }

    pub fn set_reverb_enabled(&self, enabled: bool) {
        self.update_effect(|p| p.enabled = enabled);
    }

    // Control-surface getters

    pub fn volume(&self) -> f32 {
        self.oscillator().volume
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.oscillator().waveform
    }

    pub fn waveform_index(&self) -> i32 {
        self.waveform().index()
    }

    pub fn attack(&self) -> f32 {
        self.envelope().attack
    }

    pub fn decay(&self) -> f32 {
        self.envelope().decay
    }

    pub fn sustain(&self) -> f32 {
        self.envelope().sustain
    }

    pub fn release(&self) -> f32 {
        self.envelope().release
    }

    pub fn room_size(&self) -> f32 {
        self.effect().room_size
    }

    pub fn damping(&self) -> f32 {
        self.effect().damping
    }

    pub fn wet_level(&self) -> f32 {
        self.effect().wet_level
    }

    pub fn dry_level(&self) -> f32 {
        self.effect().dry_level
    }

    pub fn width(&self) -> f32 {
        self.effect().width
    }

    pub fn freeze(&self) -> f32 {
        self.effect().freeze
    }

    pub fn reverb_enabled(&self) -> bool {
        self.effect().enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn setters_round_trip_through_getters() {
        let shared = SharedParameters::default();
        shared.set_volume(0.8);
        shared.set_waveform_index(2);
        shared.set_adsr(0.2, 0.3, 0.4, 0.5);
        shared.set_reverb(0.1, 0.2, 0.3, 0.4, 0.5, 0.6);
        shared.set_reverb_enabled(false);

        assert_eq!(shared.volume(), 0.8);
        assert_eq!(shared.waveform(), OscillatorWaveform::Saw);
        assert_eq!(shared.waveform_index(), 2);
        assert_eq!(
            (shared.attack(), shared.decay(), shared.sustain(), shared.release()),
            (0.2, 0.3, 0.4, 0.5)
        );
        assert_eq!(shared.room_size(), 0.1);
        assert_eq!(shared.freeze(), 0.6);
        assert!(!shared.reverb_enabled());
    }

    #[test]
    fn setters_clamp_bad_knob_values() {
        let shared = SharedParameters::default();
        shared.set_volume(4.0);
        shared.set_sustain(-1.0);
        shared.set_waveform_index(17);
        shared.set_width(f32::NAN);

        assert_eq!(shared.volume(), 1.0);
        assert_eq!(shared.sustain(), 0.0);
        assert_eq!(shared.waveform(), OscillatorWaveform::Triangle);
        assert_eq!(shared.width(), 1.0);
    }

    #[test]
    fn single_field_setter_keeps_the_rest_of_the_group() {
        let shared = SharedParameters::default();
        shared.set_adsr(0.2, 0.3, 0.4, 0.5);
        shared.set_decay(1.5);
        assert_eq!(shared.envelope(), EnvelopeParameters::new(0.2, 1.5, 0.4, 0.5));
    }

    #[test]
    fn groups_never_tear_under_concurrent_writes() {
        let shared = Arc::new(SharedParameters::default());
        shared.set_reverb(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let writer = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for i in 0..2_000 {
                    let v = (i % 2) as f32;
                    shared.set_reverb(v, v, v, v, v, v);
                }
            })
        };

        for _ in 0..2_000 {
            let fx = shared.snapshot().effect;
            let v = fx.room_size;
            assert!(
                [fx.damping, fx.wet_level, fx.dry_level, fx.width, fx.freeze]
                    .iter()
                    .all(|&x| x == v),
                "torn effect group: {fx:?}"
            );
        }

        writer.join().unwrap();
    }
}
