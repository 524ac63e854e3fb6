//! Fixed i-VI-III-VII progression in A minor, arpeggiated upward.

/// MIDI pitches for each chord, root first.
pub const CHORDS: [[u8; 4]; 4] = [
    [57, 60, 64, 69], // Am
    [53, 57, 60, 65], // F
    [48, 52, 55, 60], // C
    [55, 59, 62, 67], // G
];

/// Steps per chord: each chord tone once, then the whole chord held.
pub const STEPS_PER_CHORD: usize = 8;

pub enum Step {
    /// Strike one chord tone and leave it ringing.
    Strike(u8),
    /// Rest; the struck tones keep sounding.
    Hold,
}

/// What to play at `step` within the current chord.
pub fn step(chord: &[u8; 4], step: usize) -> Step {
    match chord.get(step) {
        Some(&pitch) => Step::Strike(pitch),
        None => Step::Hold,
    }
}
