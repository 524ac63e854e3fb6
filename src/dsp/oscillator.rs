//! Naive phase-accumulator oscillator.

use std::f32::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Waveform Generation
===================

Every waveform here is a pure function of one number: the phase, an angle in
radians kept inside [0, 2π). The oscillator's only job is to remember where
it is in the cycle and move forward by a fixed step each sample.

Vocabulary
----------

  phase       Position within one cycle, in radians. 0 is the start of the
              cycle, 2π is the end (and the start of the next one).

  increment   How far the phase moves per sample:

                  increment = 2π · frequency / sample_rate

              At 440 Hz and 48 kHz that is ≈ 0.0576 radians per sample,
              so one cycle takes ≈ 109 samples.

  aliasing    Harmonics above Nyquist (sample_rate / 2) fold back into the
              audible range. The square and saw below have infinite
              harmonics and alias; they are left naive on purpose.


The Four Shapes
---------------

  Sine      sin(phase)                     pure fundamental
  Square    -1 below π, +1 from π on       odd harmonics, 1/n
  Saw       phase/π - 1                    all harmonics, 1/n
  Triangle  (2/π) · asin(sin(phase))       odd harmonics, 1/n²

      Sine        Square        Saw          Triangle
     ╭─╮          ┌──┐          ╱│  ╱│        ╱╲
    ╱   ╲       ──┘  └──      ╱  │╱  │      ╱   ╲   ╱
         ╲_╱                                     ╲╱


Switching Waveforms
-------------------

Changing the waveform swaps the shape function and nothing else. The phase
keeps running, so the new shape picks up at the same point in the cycle and
no extra discontinuity is introduced by resetting to zero.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OscillatorWaveform {
    #[default]
    Sine,
    Square,
    Saw,
    Triangle,
}

impl OscillatorWaveform {
    pub const ALL: [OscillatorWaveform; 4] = [
        OscillatorWaveform::Sine,
        OscillatorWaveform::Square,
        OscillatorWaveform::Saw,
        OscillatorWaveform::Triangle,
    ];

    /// Map a control-surface selector (0..=3) to a waveform.
    ///
    /// Out-of-range indices clamp to the nearest valid shape.
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.clamp(0, 3) as usize]
    }

    pub fn index(self) -> i32 {
        match self {
            OscillatorWaveform::Sine => 0,
            OscillatorWaveform::Square => 1,
            OscillatorWaveform::Saw => 2,
            OscillatorWaveform::Triangle => 3,
        }
    }

    /// Evaluate the waveform at `phase` (radians, expected in [0, 2π)).
    #[inline]
    pub fn evaluate(self, phase: f32) -> f32 {
        match self {
            OscillatorWaveform::Sine => phase.sin(),
            OscillatorWaveform::Square => {
                if phase < PI {
                    -1.0
                } else {
                    1.0
                }
            }
            OscillatorWaveform::Saw => phase / PI - 1.0,
            OscillatorWaveform::Triangle => (2.0 / PI) * phase.sin().asin(),
        }
    }
}

pub struct OscillatorBlock {
    waveform: OscillatorWaveform,
    phase: f32,
    frequency: f32,
    sample_rate: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
            frequency: 440.0,
            sample_rate: 48_000.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn square() -> Self {
        Self::new(OscillatorWaveform::Square)
    }

    pub fn sawtooth() -> Self {
        Self::new(OscillatorWaveform::Saw)
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorWaveform::Triangle)
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    /// Swap the shape function. Phase is left untouched.
    pub fn set_waveform(&mut self, waveform: OscillatorWaveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Produce one sample and advance the phase.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let sample = self.waveform.evaluate(self.phase);

        self.phase += TAU * self.frequency / self.sample_rate;
        // rem_euclid keeps us in [0, 2π) even for very high frequencies
        if self.phase >= TAU {
            self.phase = self.phase.rem_euclid(TAU);
        }

        sample
    }

    /// Overwrite `destination` with oscillator output.
    pub fn render(&mut self, destination: &mut [f32]) {
        for sample in destination.iter_mut() {
            *sample = self.next_sample();
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
