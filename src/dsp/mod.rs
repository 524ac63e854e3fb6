//! Low-level DSP primitives used by the voices and the effect stage.
//!
//! These components are allocation-free once constructed and realtime-safe,
//! making them safe to embed directly inside voice structs. They stay focused
//! on the signal-processing math; note handling and parameter plumbing live
//! in [`crate::synth`].

/// Per-voice linear gain.
pub mod amplify;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Phase-accumulator oscillator with four naive waveforms.
pub mod oscillator;
/// Freeverb-style stereo reverb.
pub mod reverb;

pub use envelope::EnvelopeState;
pub use oscillator::OscillatorWaveform;
