//! Benchmarks for the voice pool and the engine's per-block work.
//!
//! Each scenario keeps the pool busy so the numbers reflect a saturated
//! synth rather than silence.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_poly::{
    dsp::OscillatorWaveform,
    synth::{EnvelopeParameters, NoteEvent, VoicePool},
    Engine, EngineConfig,
};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;
const CHORD: [u8; 8] = [48, 52, 55, 59, 60, 64, 67, 71];

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === FULL POOL, SUSTAINING ===
        let mut pool = VoicePool::new(8, SAMPLE_RATE);
        pool.apply_envelope_parameters(&EnvelopeParameters::new(0.01, 0.1, 0.7, 0.4));
        for pitch in CHORD {
            pool.note_on(pitch, 1.0);
        }
        group.bench_with_input(BenchmarkId::new("pool_8_sustain", size), &size, |b, _| {
            b.iter(|| {
                buffer.fill(0.0);
                pool.render_into(black_box(&mut buffer));
            })
        });

        // === STEAL CHURN ===
        // A fresh note every block into a full pool forces a steal each time
        let mut pool = VoicePool::new(8, SAMPLE_RATE);
        for pitch in CHORD {
            pool.note_on(pitch, 1.0);
        }
        let mut next = 0u8;
        group.bench_with_input(BenchmarkId::new("pool_8_steal", size), &size, |b, _| {
            b.iter(|| {
                pool.note_on(72 + next % 24, 1.0);
                next = next.wrapping_add(1);
                buffer.fill(0.0);
                pool.render_into(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // Stereo block with reverb, full chord held
        let mut engine = Engine::new(EngineConfig::default()).expect("default config is valid");
        let params = engine.parameters();
        params.set_waveform(OscillatorWaveform::Saw);
        let chord: Vec<NoteEvent> = CHORD.iter().map(|&p| NoteEvent::on(p, 1.0)).collect();
        engine.render_block_stereo(&chord, &mut left, &mut right);

        group.bench_with_input(BenchmarkId::new("stereo_reverb", size), &size, |b, _| {
            b.iter(|| engine.render_block_stereo(&[], black_box(&mut left), black_box(&mut right)))
        });

        // Same load with the reverb bypassed
        params.set_reverb_enabled(false);
        group.bench_with_input(BenchmarkId::new("stereo_bypass", size), &size, |b, _| {
            b.iter(|| engine.render_block_stereo(&[], black_box(&mut left), black_box(&mut right)))
        });

        // Parameter churn: a control write lands before every block
        params.set_reverb_enabled(true);
        let mut volume = 0.0f32;
        group.bench_with_input(BenchmarkId::new("param_churn", size), &size, |b, _| {
            b.iter(|| {
                volume = (volume + 0.01) % 1.0;
                params.set_volume(volume);
                engine.render_block_stereo(&[], black_box(&mut left), black_box(&mut right))
            })
        });
    }

    group.finish();
}
