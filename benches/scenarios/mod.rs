//! Scenario benchmarks: the voice pool and full engine blocks.

mod voices;

pub use voices::{bench_engine, bench_voices};
