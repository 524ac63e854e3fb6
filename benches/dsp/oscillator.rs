//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_poly::dsp::oscillator::OscillatorBlock;

use crate::BLOCK_SIZES;

fn tuned(mut osc: OscillatorBlock) -> OscillatorBlock {
    osc.set_sample_rate(48_000.0);
    osc.set_frequency(440.0);
    osc
}

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Sine - uses sin() transcendental function
        let mut osc = tuned(OscillatorBlock::sine());
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| osc.render(black_box(&mut buffer)))
        });

        // Sawtooth - simple linear ramp
        let mut osc = tuned(OscillatorBlock::sawtooth());
        group.bench_with_input(BenchmarkId::new("sawtooth", size), &size, |b, _| {
            b.iter(|| osc.render(black_box(&mut buffer)))
        });

        // Square - branch per sample
        let mut osc = tuned(OscillatorBlock::square());
        group.bench_with_input(BenchmarkId::new("square", size), &size, |b, _| {
            b.iter(|| osc.render(black_box(&mut buffer)))
        });

        let mut osc = tuned(OscillatorBlock::triangle());
        group.bench_with_input(BenchmarkId::new("triangle", size), &size, |b, _| {
            b.iter(|| osc.render(black_box(&mut buffer)))
        });
    }

    group.finish();
}
