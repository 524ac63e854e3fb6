//! Benchmarks for the per-voice gain stage.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_poly::dsp::amplify::Gain;

use crate::BLOCK_SIZES;

pub fn bench_amplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/amplify");
    let gain = Gain::new(0.5);

    for &size in BLOCK_SIZES {
        let signal: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Gain then sum onto the mix bus, as a voice does
        let mut bus = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("gain_into_bus", size), &size, |b, _| {
            b.iter(|| {
                for (out, &s) in bus.iter_mut().zip(black_box(&signal)) {
                    *out += gain.process(s);
                }
            })
        });
    }

    group.finish();
}
