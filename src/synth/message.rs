#[cfg(feature = "rtrb")]
use rtrb::Consumer;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoteKind {
    On,
    Off,
}

/// A note trigger or release, addressed to the voice pool.
///
/// `timestamp` is the sample offset within the block the event arrived in.
/// It orders events within a block; every event is applied at the block
/// start.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NoteEvent {
    pub pitch: u8,
    pub velocity: f32,
    pub kind: NoteKind,
    pub timestamp: u32,
}

impl NoteEvent {
    /// Pitch is clamped to 0..=127 and velocity to 0.0..=1.0.
    pub fn on(pitch: u8, velocity: f32) -> Self {
        let velocity = if velocity.is_finite() {
            velocity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            pitch: pitch.min(127),
            velocity,
            kind: NoteKind::On,
            timestamp: 0,
        }
    }

    pub fn off(pitch: u8) -> Self {
        Self {
            pitch: pitch.min(127),
            velocity: 0.0,
            kind: NoteKind::Off,
            timestamp: 0,
        }
    }

    pub fn at(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_on(&self) -> bool {
        self.kind == NoteKind::On
    }
}

/// Requests sent from the control thread to the render thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    Note(NoteEvent),
    /// Release every sounding voice normally.
    AllNotesOff,
    /// Silence every voice immediately and clear the reverb tail.
    Panic,
}

impl From<NoteEvent> for SynthMessage {
    fn from(event: NoteEvent) -> Self {
        SynthMessage::Note(event)
    }
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// A receiver that never yields anything, for engines driven purely by the
/// events passed to each render call.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMessages;

impl MessageReceiver for NoMessages {
    fn pop(&mut self) -> Option<SynthMessage> {
        None
    }
}
