//! PolySynth - demo application builder and runner

use std::time::{Duration, Instant};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info};

use saavy_poly::{
    dsp::OscillatorWaveform, io::AudioOutput, synth::SynthHandle, Engine, EngineConfig,
    MAX_BLOCK_SIZE,
};

use super::progression::{self, Step, CHORDS, STEPS_PER_CHORD};

/// Demo builder: engine shape plus what the control thread plays.
pub struct PolySynth {
    voices: usize,
    bpm: f32,
    waveforms: Vec<OscillatorWaveform>,
    duration: Duration,
}

impl PolySynth {
    pub fn new() -> Self {
        Self {
            voices: 8,
            bpm: 120.0,
            waveforms: vec![OscillatorWaveform::Sine],
            duration: Duration::from_secs(16),
        }
    }

    pub fn voices(mut self, voices: usize) -> Self {
        self.voices = voices;
        self
    }

    pub fn bpm(mut self, bpm: f32) -> Self {
        self.bpm = bpm;
        self
    }

    /// Waveforms to cycle through, one per chord.
    pub fn waveforms(mut self, waveforms: &[OscillatorWaveform]) -> Self {
        if !waveforms.is_empty() {
            self.waveforms = waveforms.to_vec();
        }
        self
    }

    pub fn duration_secs(mut self, seconds: f32) -> Self {
        self.duration = Duration::from_secs_f32(seconds.max(0.0));
        self
    }

    /// Open the default output device and play until the duration runs out.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let engine_config = EngineConfig::default()
            .with_voices(self.voices)
            .with_sample_rate(sample_rate)
            .with_channels(channels.min(2));
        let (mut engine, mut handle) =
            Engine::with_handle(engine_config).wrap_err("failed to build engine")?;

        println!("=== polysynth ===");
        println!("Voices: {}", self.voices);
        println!("Sample rate: {} Hz", sample_rate);
        println!("Channels: {}", channels);
        println!("Playing for {:.1} s... Press Ctrl+C to stop", self.duration.as_secs_f32());
        println!();

        // Buffers are sized once here; the callback only shrinks them
        let mut output = AudioOutput::new(channels, MAX_BLOCK_SIZE);

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    for buf in &mut output.buffers {
                        buf.resize(frames, 0.0);
                    }

                    engine.process_block(&[], &mut output);

                    let start = frames_written * channels;
                    output.interleave_into(&mut data[start..start + frames * channels], frames);
                    frames_written += frames;
                }
            },
            |err| error!("audio stream error: {err}"),
            None,
        )?;

        stream.play()?;
        info!("stream started");

        self.play(&mut handle);

        handle.all_notes_off();
        // Let the release and reverb tail ring out
        std::thread::sleep(Duration::from_secs(2));
        handle.panic();
        std::thread::sleep(Duration::from_millis(50));

        info!("done");
        Ok(())
    }

    /// Control-thread loop: walk the progression, one waveform per chord.
    fn play(&self, handle: &mut SynthHandle) {
        let step_len = Duration::from_secs_f32(60.0 / self.bpm / 2.0);
        let started = Instant::now();

        let params = handle.shared_params();
        params.set_adsr(0.02, 0.3, 0.6, 0.8);
        params.set_reverb(0.7, 0.4, 0.35, 0.7, 1.0, 0.0);
        params.set_volume(0.15);

        let mut chord_index = 0;
        while started.elapsed() < self.duration {
            let chord = &CHORDS[chord_index % CHORDS.len()];
            let waveform = self.waveforms[chord_index % self.waveforms.len()];
            params.set_waveform(waveform);
            info!("chord {chord:?} on {waveform:?}");

            for step in 0..STEPS_PER_CHORD {
                if let Step::Strike(pitch) = progression::step(chord, step) {
                    handle.note_on(pitch, 0.8);
                }
                std::thread::sleep(step_len);
            }

            for &pitch in chord {
                handle.note_off(pitch);
            }
            chord_index += 1;
        }
    }
}

impl Default for PolySynth {
    fn default() -> Self {
        Self::new()
    }
}
