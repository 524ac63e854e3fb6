/*
ADSR Envelope Implementation
============================

A linear ADSR envelope generator: the gain curve every voice multiplies its
oscillator by.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0).

  stage       Idle, Attack, Decay, Sustain or Release. A state machine
              governs transitions.

  gate        The note on/off signal. Gate high (note_on) enters Attack.
              Gate low (note_off) enters Release from wherever we are.

  step        How much `level` changes per sample. Derived from the stage
              duration in samples, which is never less than one.


The Shape: Linear Ramps
-----------------------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

All ramps are straight lines in linear level, not in dB.


Durations in Samples
--------------------

Stage lengths are stored in seconds and converted when needed:

    samples = max(1, round(seconds * sample_rate))

The one-sample floor means a zero attack still takes one sample to reach
1.0, and a zero release still takes one sample to reach silence. No stage
ever divides by zero.


Retriggering
------------

note_on while the envelope is still sounding does NOT snap the level back
to zero. Attack restarts from wherever the level currently is and climbs
with the usual slope, so a repeated note never produces a jump in gain.

    Level
    1.0 ┐     ╱╲        ╱╲
        │    ╱  ╲______╱  ╲_____
        │   ╱          ↑
        │  ╱        retrigger (level continues from S)


Release
-------

At note_off we snapshot the current level and the release length in samples,
then interpolate linearly down to exactly 0.0:

    level = start * (1 - elapsed / total)

Sustain Changes
---------------

Changing the sustain level under a sounding note never steps the output.
Decay only ever falls; if the new sustain is above the current level, Decay
hands over to Sustain immediately. Sustain glides toward a changed level at
a fixed slope (full scale in SUSTAIN_GLIDE_SECONDS).


Reaching the end of Release is the only way back to Idle. Voice management
relies on that: a voice is free exactly when its envelope is Idle.
*/

/// Slack for ramps that accumulate a float step per sample.
const LEVEL_EPSILON: f32 = 1e-6;

/// Time for a full-scale move of the held level when sustain changes.
const SUSTAIN_GLIDE_SECONDS: f32 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct Envelope {
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,
    sample_rate: f32,

    stage: EnvelopeState,
    level: f32,
    samples_in_stage: u32,

    // Release bookkeeping, fixed at note_off
    release_start_level: f32,
    release_total_samples: u32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl Envelope {
    pub fn new() -> Self {
        Self::adsr(0.1, 0.1, 1.0, 0.4)
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        let mut env = Self {
            attack_time: 0.0,
            decay_time: 0.0,
            sustain_level: 0.0,
            release_time: 0.0,
            sample_rate: 48_000.0,

            stage: EnvelopeState::Idle,
            level: 0.0,
            samples_in_stage: 0,
            release_start_level: 0.0,
            release_total_samples: 1,
        };
        env.set_params(attack, decay, sustain, release);
        env
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Replace the shape. Takes effect on the next sample; an in-flight
    /// release keeps the length it was started with.
    pub fn set_params(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.attack_time = attack.max(0.0);
        self.decay_time = decay.max(0.0);
        self.sustain_level = sustain.clamp(0.0, 1.0);
        self.release_time = release.max(0.0);
    }

    #[inline]
    fn samples_for(&self, seconds: f32) -> u32 {
        (seconds * self.sample_rate).round().max(1.0) as u32
    }

    fn enter(&mut self, stage: EnvelopeState) {
        self.stage = stage;
        self.samples_in_stage = 0;
    }

    /// Gate high. Attack continues from the current level.
    pub fn note_on(&mut self) {
        self.enter(EnvelopeState::Attack);
    }

    /// Gate low: release from the current level. Ignored when idle or
    /// already releasing.
    pub fn note_off(&mut self) {
        if matches!(self.stage, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = self.samples_for(self.release_time);
        self.enter(EnvelopeState::Release);
    }

    /// Advance the envelope by one sample and return the new level.
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                let step = 1.0 / self.samples_for(self.attack_time) as f32;
                self.level += step;
                self.samples_in_stage += 1;

                if self.level >= 1.0 - LEVEL_EPSILON {
                    self.level = 1.0;
                    self.enter(EnvelopeState::Decay);
                }
            }

            EnvelopeState::Decay => {
                let target = self.sustain_level;
                self.samples_in_stage += 1;

                if target >= self.level {
                    // Sustain was raised above us; Sustain glides up to it
                    self.enter(EnvelopeState::Sustain);
                } else {
                    let step = (1.0 - target) / self.samples_for(self.decay_time) as f32;
                    self.level = (self.level - step).max(target);

                    if self.level <= target + LEVEL_EPSILON {
                        self.level = target;
                        self.enter(EnvelopeState::Sustain);
                    }
                }
            }

            EnvelopeState::Sustain => {
                let step = 1.0 / self.samples_for(SUSTAIN_GLIDE_SECONDS) as f32;
                let target = self.sustain_level;
                self.level = if self.level < target {
                    (self.level + step).min(target)
                } else {
                    (self.level - step).max(target)
                };
                self.samples_in_stage = self.samples_in_stage.saturating_add(1);
            }

            EnvelopeState::Release => {
                self.samples_in_stage = self.samples_in_stage.saturating_add(1);

                if self.samples_in_stage >= self.release_total_samples {
                    self.level = 0.0;
                    self.enter(EnvelopeState::Idle);
                } else {
                    let progress =
                        self.samples_in_stage as f32 / self.release_total_samples as f32;
                    // min() guards against float drift nudging the ramp upward
                    self.level = (self.release_start_level * (1.0 - progress))
                        .min(self.level)
                        .max(0.0);
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    /// How far through Release we are, 0.0 at note_off and 1.0 at silence.
    /// `None` outside the Release stage.
    pub fn release_progress(&self) -> Option<f32> {
        match self.stage {
            EnvelopeState::Release => {
                Some(self.samples_in_stage as f32 / self.release_total_samples as f32)
            }
            _ => None,
        }
    }

    /// Hard reset to silence. Only for panic/reset paths; normal note flow
    /// goes through Release.
    pub fn reset(&mut self) {
        self.level = 0.0;
        self.release_start_level = 0.0;
        self.enter(EnvelopeState::Idle);
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}
