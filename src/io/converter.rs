use crate::{io::midi::MidiEvent, synth::message::NoteEvent};

/// Translate a raw MIDI message into a note event.
///
/// `channel_filter` of `None` accepts every channel. A note-on with velocity
/// 0 is a note-off, per the MIDI running-status convention. Everything other
/// than note on/off is ignored.
pub fn midi_to_note_event(midi: MidiEvent, channel_filter: Option<u8>) -> Option<NoteEvent> {
    let accepts = |channel: u8| channel_filter.map_or(true, |c| c == channel);

    let event = match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
            ..
        } if accepts(channel) => {
            if velocity == 0 {
                NoteEvent::off(key)
            } else {
                NoteEvent::on(key, velocity_to_unit(velocity))
            }
        }
        MidiEvent::NoteOff { channel, key, .. } if accepts(channel) => NoteEvent::off(key),
        _ => return None,
    };

    Some(event.at(midi.offset()))
}

/// MIDI velocity 0..=127 to 0.0..=1.0.
pub fn velocity_to_unit(velocity: u8) -> f32 {
    velocity.min(127) as f32 / 127.0
}

/// Equal-temperament tuning, A4 (note 69) = 440 Hz.
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
