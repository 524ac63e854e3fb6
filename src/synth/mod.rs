// Purpose: Voice management, polyphony, parameter plumbing
// This layer sits above the dsp primitives and below the engine facade

#[cfg(feature = "rtrb")]
pub mod handle;
pub mod message;
pub mod params;
pub mod pool;
pub mod shared;
pub mod snapshot;
pub mod voice;

#[cfg(feature = "rtrb")]
pub use handle::SynthHandle;
pub use message::{NoteEvent, NoteKind, SynthMessage};
pub use params::{EffectParameters, EnvelopeParameters, OscillatorParameters, SynthParameters};
pub use pool::VoicePool;
pub use shared::SharedParameters;
pub use snapshot::ParameterSnapshot;
pub use voice::{Voice, VoiceState};
