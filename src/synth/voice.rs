use crate::{
    dsp::{
        amplify::Gain,
        envelope::{Envelope, EnvelopeState},
        oscillator::OscillatorBlock,
    },
    io::converter::midi_note_to_freq,
    synth::params::{EnvelopeParameters, OscillatorParameters},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Playing, envelope in attack/decay/sustain
    Releasing, // Key released, envelope in release phase
}

/// One monophonic synthesis unit: oscillator → gain → envelope.
///
/// Voices are created once when the pool is built and reused for every note.
pub struct Voice {
    osc: OscillatorBlock,
    env: Envelope,
    gain: Gain,
    note: Option<u8>,
    velocity: f32,
    busy: bool,
    age: u64,
}

impl Voice {
    pub fn new(sample_rate: f32) -> Self {
        let mut voice = Self {
            osc: OscillatorBlock::sine(),
            env: Envelope::new(),
            gain: Gain::default(),
            note: None,
            velocity: 0.0,
            busy: false,
            age: 0,
        };
        voice.prepare(sample_rate);
        voice.set_oscillator(&OscillatorParameters::default());
        voice.set_envelope(&EnvelopeParameters::default());
        voice
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        self.osc.set_sample_rate(sample_rate);
        self.env.set_sample_rate(sample_rate);
    }

    pub fn set_envelope(&mut self, params: &EnvelopeParameters) {
        self.env
            .set_params(params.attack, params.decay, params.sustain, params.release);
    }

    pub fn set_oscillator(&mut self, params: &OscillatorParameters) {
        self.gain.set_linear(params.volume);
        self.osc.set_waveform(params.waveform);
    }

    /// Begin (or retrigger) a note. `age` is the pool's trigger counter and
    /// orders voices for stealing.
    ///
    /// Velocity is recorded but does not scale the output.
    pub fn start(&mut self, note: u8, velocity: f32, age: u64) {
        self.note = Some(note);
        self.velocity = velocity;
        self.age = age;
        self.busy = true;

        self.osc.set_frequency(midi_note_to_freq(note));
        self.env.note_on();
    }

    /// Release the note. The voice stays busy until its tail has finished.
    pub fn stop(&mut self) {
        if self.busy {
            self.env.note_off();
        }
    }

    /// Add this voice's output into `out`. Idle voices add nothing.
    pub fn render_into(&mut self, out: &mut [f32]) {
        if !self.busy {
            return;
        }

        for sample in out.iter_mut() {
            let level = self.env.next_sample();
            *sample += self.gain.process(self.osc.next_sample()) * level;
        }

        if !self.env.is_active() {
            self.free();
        }
    }

    /// Drop the note immediately, skipping the release tail. The next note
    /// starts from phase zero.
    pub fn kill(&mut self) {
        self.env.reset();
        self.osc.reset();
        self.free();
    }

    fn free(&mut self) {
        self.busy = false;
        self.note = None;
        self.velocity = 0.0;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_free(&self) -> bool {
        !self.busy
    }

    pub fn state(&self) -> VoiceState {
        match (self.busy, self.env.state()) {
            (false, _) => VoiceState::Free,
            (true, EnvelopeState::Release) => VoiceState::Releasing,
            (true, _) => VoiceState::Active,
        }
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn frequency(&self) -> f32 {
        self.osc.frequency()
    }

    pub fn envelope_state(&self) -> EnvelopeState {
        self.env.state()
    }

    pub fn envelope_level(&self) -> f32 {
        self.env.level()
    }

    pub fn release_progress(&self) -> Option<f32> {
        self.env.release_progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn start_tunes_to_equal_temperament() {
        let mut voice = Voice::new(SAMPLE_RATE);
        voice.start(69, 1.0, 0);
        assert_relative_eq!(voice.frequency(), 440.0);

        voice.start(81, 1.0, 1);
        assert_relative_eq!(voice.frequency(), 880.0, epsilon = 1e-3);
        assert!(voice.is_busy());
        assert_eq!(voice.note(), Some(81));
    }

    #[test]
    fn render_accumulates_into_buffer() {
        let mut voice = Voice::new(SAMPLE_RATE);
        voice.set_oscillator(&OscillatorParameters {
            volume: 1.0,
            waveform: crate::dsp::OscillatorWaveform::Square,
        });
        voice.set_envelope(&EnvelopeParameters::new(0.0, 0.0, 1.0, 0.1));
        voice.start(60, 1.0, 0);

        // Square starts at -1 and the envelope is at 1.0 after one sample
        let mut out = [0.5f32; 4];
        voice.render_into(&mut out);
        assert_eq!(out[0], -0.5);
    }

    #[test]
    fn idle_voice_renders_nothing() {
        let mut voice = Voice::new(SAMPLE_RATE);
        let mut out = [0.25f32; 16];
        voice.render_into(&mut out);
        assert!(out.iter().all(|&s| s == 0.25));
        assert_eq!(voice.state(), VoiceState::Free);
    }

    #[test]
    fn stays_busy_through_release_then_frees() {
        let mut voice = Voice::new(SAMPLE_RATE);
        voice.set_envelope(&EnvelopeParameters::new(0.001, 0.001, 0.8, 0.01));
        voice.start(64, 0.5, 3);

        let mut out = vec![0.0f32; 256];
        voice.render_into(&mut out);
        voice.stop();
        assert_eq!(voice.state(), VoiceState::Releasing);
        assert!(voice.is_busy());

        // 10 ms release at 48 kHz = 480 samples
        out.fill(0.0);
        voice.render_into(&mut out);
        assert!(voice.is_busy());
        voice.render_into(&mut out);
        voice.render_into(&mut out);

        assert!(voice.is_free());
        assert_eq!(voice.note(), None);
        assert_eq!(voice.envelope_state(), EnvelopeState::Idle);
    }

    #[test]
    fn kill_frees_immediately() {
        let mut voice = Voice::new(SAMPLE_RATE);
        voice.start(50, 1.0, 0);
        voice.kill();
        assert!(voice.is_free());
        assert_eq!(voice.envelope_level(), 0.0);
    }

    #[test]
    fn killed_voice_restarts_from_phase_zero() {
        let mut voice = Voice::new(SAMPLE_RATE);
        voice.set_oscillator(&OscillatorParameters {
            volume: 1.0,
            waveform: crate::dsp::OscillatorWaveform::Square,
        });
        voice.set_envelope(&EnvelopeParameters::new(0.0, 0.0, 1.0, 0.1));

        // 100 samples of middle C carries the phase past π
        voice.start(60, 1.0, 0);
        let mut out = vec![0.0f32; 100];
        voice.render_into(&mut out);
        assert_eq!(out[99], 1.0);

        voice.kill();
        voice.start(60, 1.0, 1);
        let mut first = [0.0f32; 1];
        voice.render_into(&mut first);
        assert_eq!(first[0], -1.0);
    }
}
