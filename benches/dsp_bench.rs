//! Benchmarks for DSP primitives and full-engine scenarios.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Low-level primitives (oscillator, envelope, gain, reverb)
//!   - scenarios/*  Voice pool and engine blocks under load

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    dsp::bench_amplify,
    dsp::bench_oscillator,
    dsp::bench_envelope,
    dsp::bench_reverb,
    scenarios::bench_voices,
    scenarios::bench_engine,
);
criterion_main!(benches);
