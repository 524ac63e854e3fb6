use std::sync::Arc;

use log::warn;
use rtrb::{Producer, PushError};

use crate::synth::{
    message::{NoteEvent, SynthMessage},
    shared::SharedParameters,
    snapshot::ParameterSnapshot,
};

/// Control-thread side of an engine: note requests go through a wait-free
/// ring buffer, parameters through [`SharedParameters`].
///
/// The handle is `Send` and is meant to live on exactly one control thread.
pub struct SynthHandle {
    params: Arc<SharedParameters>,
    tx: Producer<SynthMessage>,
}

impl SynthHandle {
    pub(crate) fn new(params: Arc<SharedParameters>, tx: Producer<SynthMessage>) -> Self {
        Self { params, tx }
    }

    fn send(&mut self, msg: SynthMessage) -> bool {
        match self.tx.push(msg) {
            Ok(()) => true,
            Err(PushError::Full(msg)) => {
                warn!("note queue full, dropping {msg:?}");
                false
            }
        }
    }

    /// Queue a note-on for the next block. Returns false if the queue is full.
    pub fn note_on(&mut self, pitch: u8, velocity: f32) -> bool {
        self.send(NoteEvent::on(pitch, velocity).into())
    }

    pub fn note_off(&mut self, pitch: u8) -> bool {
        self.send(NoteEvent::off(pitch).into())
    }

    pub fn all_notes_off(&mut self) -> bool {
        self.send(SynthMessage::AllNotesOff)
    }

    pub fn panic(&mut self) -> bool {
        self.send(SynthMessage::Panic)
    }

    /// Setters and getters for every control.
    pub fn params(&self) -> &SharedParameters {
        &self.params
    }

    pub fn shared_params(&self) -> Arc<SharedParameters> {
        Arc::clone(&self.params)
    }

    pub fn capture(&self) -> ParameterSnapshot {
        self.params.capture()
    }

    pub fn apply(&self, snapshot: &ParameterSnapshot) {
        self.params.apply(snapshot);
    }

    #[cfg(feature = "serde")]
    pub fn save_json(&self) -> crate::Result<String> {
        self.capture().to_json()
    }

    #[cfg(feature = "serde")]
    pub fn load_json(&self, document: &str) -> crate::Result<()> {
        let snapshot = ParameterSnapshot::from_json(document)?;
        self.apply(&snapshot);
        Ok(())
    }

    /// Free slots left in the note queue.
    pub fn queue_capacity_left(&self) -> usize {
        self.tx.slots()
    }
}
