//! Benchmarks for low-level DSP primitives.

mod amplify;
mod envelope;
mod oscillator;
mod reverb;

pub use amplify::bench_amplify;
pub use envelope::bench_envelope;
pub use oscillator::bench_oscillator;
pub use reverb::bench_reverb;
