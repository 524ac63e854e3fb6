//! Real-time entry point: parameter snapshot, note dispatch, mix, effect.
//!
//! One [`Engine`] is owned by whoever owns the audio callback. Per block it:
//! 1. copies every parameter group out of [`SharedParameters`] once,
//! 2. drains queued control-thread messages,
//! 3. dispatches the block's note events in timestamp order,
//! 4. runs the mixer and reverb exactly once over the whole block.
//!
//! All events apply at the start of the block; there is no sample-accurate
//! scheduling inside a block.

pub mod config;
pub mod mixer;

use std::sync::Arc;

use log::{debug, info};

pub use self::config::EngineConfig;
use self::{config::validate_stream, mixer::Mixer};
use crate::{
    io::{converter::midi_to_note_event, midi::MidiEvent, AudioOutput},
    synth::{
        message::{MessageReceiver, NoMessages, NoteEvent, SynthMessage},
        params::SynthParameters,
        pool::VoicePool,
        shared::SharedParameters,
        snapshot::ParameterSnapshot,
    },
    Result,
};

#[cfg(feature = "rtrb")]
use crate::synth::handle::SynthHandle;
#[cfg(feature = "rtrb")]
use rtrb::{Consumer, RingBuffer};

pub struct Engine<R: MessageReceiver = NoMessages> {
    pool: VoicePool,
    mixer: Mixer,
    params: Arc<SharedParameters>,
    rx: R,

    sample_rate: f32,
    max_block_size: usize,
    channels: usize,

    /// Parameters the current block renders with.
    current: SynthParameters,

    // Preallocated scratch so dispatch never allocates
    sorted_events: Vec<NoteEvent>,
    midi_events: Vec<NoteEvent>,
    dropped_events: u64,
}

impl Engine<NoMessages> {
    /// An engine driven only by the events passed to each render call.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_receiver(config, NoMessages)
    }
}

#[cfg(feature = "rtrb")]
impl Engine<Consumer<SynthMessage>> {
    /// An engine plus the control-thread handle that feeds it.
    pub fn with_handle(config: EngineConfig) -> Result<(Self, SynthHandle)> {
        config.validate()?;
        let (tx, rx) = RingBuffer::<SynthMessage>::new(config.queue_capacity);
        let engine = Self::with_receiver(config, rx)?;
        let handle = SynthHandle::new(engine.parameters(), tx);
        Ok((engine, handle))
    }
}

impl<R: MessageReceiver> Engine<R> {
    pub fn with_receiver(config: EngineConfig, rx: R) -> Result<Self> {
        config.validate()?;

        let params = Arc::new(SharedParameters::new(config.params));
        let current = params.snapshot();

        let mut pool = VoicePool::new(config.voices, config.sample_rate);
        pool.apply_oscillator_parameters(&current.oscillator);
        pool.apply_envelope_parameters(&current.envelope);

        let mixer = Mixer::new(config.sample_rate, &current.effect);

        info!(
            "engine created: {} voices, {} Hz, {} channel(s), max block {}",
            config.voices, config.sample_rate, config.channels, config.max_block_size
        );

        Ok(Self {
            pool,
            mixer,
            params,
            rx,
            sample_rate: config.sample_rate,
            max_block_size: config.max_block_size,
            channels: config.channels,
            current,
            sorted_events: Vec::with_capacity(config.max_events_per_block),
            midi_events: Vec::with_capacity(config.max_events_per_block),
            dropped_events: 0,
        })
    }

    /// Reconfigure for a new stream. Not realtime-safe; call it from the
    /// host's setup path whenever sample rate or block size changes.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize, channels: usize) -> Result<()> {
        validate_stream(sample_rate, max_block_size, channels)?;

        self.pool.prepare(sample_rate);
        self.mixer.prepare(sample_rate);
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.channels = channels;

        info!("engine prepared: {sample_rate} Hz, max block {max_block_size}, {channels} channel(s)");
        Ok(())
    }

    /// Control-surface side of this engine's parameters.
    pub fn parameters(&self) -> Arc<SharedParameters> {
        Arc::clone(&self.params)
    }

    pub fn apply(&self, snapshot: &ParameterSnapshot) {
        self.params.apply(snapshot);
    }

    pub fn capture(&self) -> ParameterSnapshot {
        self.params.capture()
    }

    /// Render one mono block. `out.len()` is the frame count and must not
    /// exceed the prepared maximum block size.
    pub fn render_block(&mut self, events: &[NoteEvent], out: &mut [f32]) {
        debug_assert!(
            out.len() <= self.max_block_size,
            "block of {} frames exceeds prepared maximum {}",
            out.len(),
            self.max_block_size
        );
        self.begin_block(events);
        self.mixer.mix(&mut self.pool, out);
    }

    /// Render one stereo block. Neither buffer may exceed the prepared
    /// maximum block size.
    ///
    /// Buffers of unequal length render the common length; the excess of
    /// the longer one is zeroed.
    pub fn render_block_stereo(&mut self, events: &[NoteEvent], left: &mut [f32], right: &mut [f32]) {
        debug_assert!(
            left.len().max(right.len()) <= self.max_block_size,
            "block of {} frames exceeds prepared maximum {}",
            left.len().max(right.len()),
            self.max_block_size
        );
        self.begin_block(events);
        self.mixer.mix_stereo(&mut self.pool, left, right);
    }

    /// Host entry point: raw MIDI in, one buffer per output channel out.
    ///
    /// Renders `output.frames()` frames. Channels beyond the first two are
    /// zeroed.
    pub fn process_block(&mut self, midi: &[MidiEvent], output: &mut AudioOutput) {
        let mut notes = std::mem::take(&mut self.midi_events);
        notes.clear();

        let cap = notes.capacity();
        let mut converted = midi.iter().filter_map(|m| midi_to_note_event(*m, None));
        notes.extend(converted.by_ref().take(cap));
        self.dropped_events += converted.count() as u64;

        let frames = output.frames();
        match output.buffers.as_mut_slice() {
            [] => self.begin_block(&notes),
            [mono] => self.render_block(&notes, &mut mono[..frames]),
            [left, right, rest @ ..] => {
                self.render_block_stereo(&notes, &mut left[..frames], &mut right[..frames]);
                for extra in rest {
                    extra.fill(0.0);
                }
            }
        }

        self.midi_events = notes;
    }

    fn begin_block(&mut self, events: &[NoteEvent]) {
        // One copy of every group per block
        self.current = self.params.snapshot();
        self.pool.apply_oscillator_parameters(&self.current.oscillator);
        self.pool.apply_envelope_parameters(&self.current.envelope);
        self.mixer.apply_reverb_parameters(&self.current.effect);

        while let Some(msg) = self.rx.pop() {
            match msg {
                SynthMessage::Note(event) => self.pool.handle_event(&event),
                SynthMessage::AllNotesOff => self.pool.all_notes_off(),
                SynthMessage::Panic => {
                    self.pool.kill_all();
                    self.mixer.reset();
                }
            }
        }

        self.dispatch_in_order(events);
    }

    fn dispatch_in_order(&mut self, events: &[NoteEvent]) {
        if events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
            for event in events {
                self.pool.handle_event(event);
            }
            return;
        }

        let (head, tail) = events.split_at(events.len().min(self.sorted_events.capacity()));
        self.sorted_events.clear();
        self.sorted_events.extend_from_slice(head);
        insertion_sort_by_timestamp(&mut self.sorted_events);

        for event in self.sorted_events.iter().chain(tail) {
            self.pool.handle_event(event);
        }
    }

    /// Release every voice normally, from the render thread's owner.
    pub fn all_notes_off(&mut self) {
        self.pool.all_notes_off();
    }

    /// Silence everything now and clear the reverb tail.
    pub fn reset(&mut self) {
        debug!("engine reset");
        self.pool.kill_all();
        self.mixer.reset();
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    /// Parameters in effect for the most recent block.
    pub fn current_parameters(&self) -> &SynthParameters {
        &self.current
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn active_voices(&self) -> usize {
        self.pool.busy_count()
    }

    /// MIDI note events dropped because a block carried more than
    /// `max_events_per_block` of them.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events
    }
}

/// Stable in-place sort; never allocates.
fn insertion_sort_by_timestamp(events: &mut [NoteEvent]) {
    for i in 1..events.len() {
        let mut j = i;
        while j > 0 && events[j - 1].timestamp > events[j].timestamp {
            events.swap(j - 1, j);
            j -= 1;
        }
    }
}
