pub mod dsp;
pub mod engine; // Realtime facade: snapshot, dispatch, mix, reverb
pub mod error;
pub mod io;
pub mod synth; // Voice management and polyphony

pub use engine::{Engine, EngineConfig};
pub use error::{Error, Result};

pub const MAX_BLOCK_SIZE: usize = 2048;
