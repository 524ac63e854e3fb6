/// Raw channel messages as a host or MIDI port delivers them.
///
/// `offset` is the sample position of the message within the current block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8, offset: u32 },
    NoteOff { channel: u8, key: u8, velocity: u8, offset: u32 },
    ControlChange { channel: u8, controller: u8, value: u8, offset: u32 },
    PitchBend { channel: u8, value: i16, offset: u32 },
    ProgramChange { channel: u8, program: u8, offset: u32 },
}

impl MidiEvent {
    pub fn offset(&self) -> u32 {
        match *self {
            MidiEvent::NoteOn { offset, .. }
            | MidiEvent::NoteOff { offset, .. }
            | MidiEvent::ControlChange { offset, .. }
            | MidiEvent::PitchBend { offset, .. }
            | MidiEvent::ProgramChange { offset, .. } => offset,
        }
    }
}
