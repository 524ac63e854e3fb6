use crate::synth::{
    message::NoteEvent,
    params::{EnvelopeParameters, OscillatorParameters},
    voice::{Voice, VoiceState},
};

/// Fixed pool of voices plus the allocation policy that maps note events
/// onto them.
///
/// Allocation order for a note-on:
/// 1. a voice already holding the same pitch is retriggered in place,
/// 2. otherwise the first free voice,
/// 3. otherwise a stolen voice: the releasing voice furthest into its
///    release, or the oldest-triggered voice when none is releasing.
pub struct VoicePool {
    voices: Vec<Voice>,
    trigger_counter: u64,
    oscillator: OscillatorParameters,
    envelope: EnvelopeParameters,
}

impl VoicePool {
    /// Allocates every voice up front. `size` must be at least 1.
    pub fn new(size: usize, sample_rate: f32) -> Self {
        debug_assert!(size > 0, "voice pool needs at least one voice");

        let voices = (0..size.max(1)).map(|_| Voice::new(sample_rate)).collect();

        Self {
            voices,
            trigger_counter: 0,
            oscillator: OscillatorParameters::default(),
            envelope: EnvelopeParameters::default(),
        }
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        for voice in &mut self.voices {
            voice.prepare(sample_rate);
        }
    }

    pub fn handle_event(&mut self, event: &NoteEvent) {
        if event.is_on() {
            self.note_on(event.pitch, event.velocity);
        } else {
            self.note_off(event.pitch);
        }
    }

    pub fn note_on(&mut self, pitch: u8, velocity: f32) {
        let age = self.trigger_counter;
        self.trigger_counter = self.trigger_counter.wrapping_add(1);

        let idx = self.allocate_voice(pitch);
        self.voices[idx].start(pitch, velocity, age);
    }

    /// Release the voice holding `pitch`. Returns false when no busy voice
    /// holds it; that is not an error.
    pub fn note_off(&mut self, pitch: u8) -> bool {
        match self.find_voice(pitch) {
            Some(voice) => {
                voice.stop();
                true
            }
            None => false,
        }
    }

    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.stop();
        }
    }

    /// Silence everything without release tails.
    pub fn kill_all(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
    }

    pub fn apply_envelope_parameters(&mut self, params: &EnvelopeParameters) {
        if self.envelope == *params {
            return;
        }
        self.envelope = *params;
        for voice in &mut self.voices {
            voice.set_envelope(params);
        }
    }

    pub fn apply_oscillator_parameters(&mut self, params: &OscillatorParameters) {
        if self.oscillator == *params {
            return;
        }
        self.oscillator = *params;
        for voice in &mut self.voices {
            voice.set_oscillator(params);
        }
    }

    /// Accumulate every voice into `out`. Idle voices are a no-op.
    pub fn render_into(&mut self, out: &mut [f32]) {
        for voice in &mut self.voices {
            voice.render_into(out);
        }
    }

    fn allocate_voice(&self, pitch: u8) -> usize {
        // Same pitch already sounding: retrigger it so a pitch never holds
        // two voices
        if let Some(idx) = self
            .voices
            .iter()
            .position(|v| v.is_busy() && v.note() == Some(pitch))
        {
            return idx;
        }

        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return idx;
        }

        self.steal_candidate()
    }

    fn steal_candidate(&self) -> usize {
        let releasing = self
            .voices
            .iter()
            .enumerate()
            .filter_map(|(idx, v)| v.release_progress().map(|p| (idx, p, v.age())))
            .max_by(|a, b| {
                a.1.total_cmp(&b.1)
                    // on equal progress, older (smaller age) wins
                    .then_with(|| b.2.cmp(&a.2))
            })
            .map(|(idx, _, _)| idx);

        releasing.unwrap_or_else(|| {
            self.voices
                .iter()
                .enumerate()
                .min_by_key(|(_, v)| v.age())
                .map(|(idx, _)| idx)
                .unwrap_or(0)
        })
    }

    fn find_voice(&mut self, pitch: u8) -> Option<&mut Voice> {
        self.voices
            .iter_mut()
            .find(|v| v.is_busy() && v.note() == Some(pitch))
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn busy_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_busy()).count()
    }

    pub fn releasing_count(&self) -> usize {
        self.voices
            .iter()
            .filter(|v| v.state() == VoiceState::Releasing)
            .count()
    }

    /// Pitches currently held by busy voices, in voice order.
    pub fn active_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.voices.iter().filter_map(|v| v.note())
    }

    pub fn envelope_parameters(&self) -> &EnvelopeParameters {
        &self.envelope
    }

    pub fn oscillator_parameters(&self) -> &OscillatorParameters {
        &self.oscillator
    }
}
