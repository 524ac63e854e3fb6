//! Benchmarks for the stereo reverb.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_poly::dsp::reverb::StereoReverb;

use crate::BLOCK_SIZES;

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f32 / 10.0) // Initial impulse
                } else {
                    (i as f32 * 0.05).sin() * 0.1 // Quiet tail
                }
            })
            .collect();
        let mut left = input.clone();
        let mut right = input.clone();

        let mut reverb = StereoReverb::new(sample_rate);
        reverb.set_room_size(0.3);
        group.bench_with_input(BenchmarkId::new("stereo_small_room", size), &size, |b, _| {
            b.iter(|| {
                left.copy_from_slice(&input);
                right.copy_from_slice(&input);
                reverb.process_stereo(black_box(&mut left), black_box(&mut right));
            })
        });

        let mut reverb = StereoReverb::new(sample_rate);
        reverb.set_room_size(0.9);
        reverb.set_damping(0.3);
        group.bench_with_input(BenchmarkId::new("mono_large_room", size), &size, |b, _| {
            b.iter(|| {
                left.copy_from_slice(&input);
                reverb.process_mono(black_box(&mut left));
            })
        });
    }

    group.finish();
}
