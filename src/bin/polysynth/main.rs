//! polysynth - plays a chord progression through the default output device
//!
//! Run with: cargo run --bin polysynth [seconds]
//! Set RUST_LOG=debug for engine and parameter logging.

mod app;
mod progression;

use app::PolySynth;
use color_eyre::eyre::{Result, WrapErr};
use saavy_poly::dsp::OscillatorWaveform;

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let seconds = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<f32>()
            .wrap_err_with(|| format!("invalid duration {arg:?}"))?,
        None => 16.0,
    };

    PolySynth::new()
        .voices(8)
        .bpm(96.0)
        .waveforms(&[
            OscillatorWaveform::Saw,
            OscillatorWaveform::Square,
            OscillatorWaveform::Triangle,
            OscillatorWaveform::Sine,
        ])
        .duration_secs(seconds)
        .run()
}
