//! Fluent track builder.

use vsq_engine::{Clock, ControlBus, Engine, LoopLength};
use vsq_ir::{Instrument, Note, SeqEvent};

use crate::error::ComposeError;
use crate::sink::PatternSink;

/// Velocity of notes added without an explicit one.
pub const DEFAULT_VELOCITY: u8 = 110;

/// Entry point for composing several tracks into one sink.
pub struct Song<'a, S: ?Sized> {
    sink: &'a mut S,
}

impl<'a, S: PatternSink + ?Sized> Song<'a, S> {
    pub fn new(sink: &'a mut S) -> Self {
        Self { sink }
    }

    /// Start composing a track. The track is cleared first.
    pub fn track(&mut self, track: usize) -> TrackComposer<'_, S> {
        TrackComposer::new(&mut *self.sink, track)
    }
}

impl<'a, B, C, const TRACKS: usize, const EVENTS: usize, const VOICES: usize>
    Song<'a, Engine<B, C, TRACKS, EVENTS, VOICES>>
where
    B: ControlBus,
    C: Clock,
{
    /// Start playback. Looping uses the longest track as loop length;
    /// otherwise every event plays once and the sequence never wraps.
    pub fn play(&mut self, looping: bool) {
        self.sink.start_with(if looping { LoopLength::Auto } else { LoopLength::Once });
    }
}

/// Appends notes to one track, advancing a time cursor.
///
/// The first failure (bad note name, full track) is kept and every later
/// call becomes a no-op; [`finish`](Self::finish) reports it.
pub struct TrackComposer<'a, S: ?Sized> {
    sink: &'a mut S,
    track: usize,
    cursor: u32,
    instrument: Instrument,
    channel: u8,
    velocity: u8,
    error: Option<ComposeError>,
}

impl<'a, S: PatternSink + ?Sized> TrackComposer<'a, S> {
    pub fn new(sink: &'a mut S, track: usize) -> Self {
        let error = sink.clear_track(track).err().map(ComposeError::from);
        Self {
            sink,
            track,
            cursor: 0,
            instrument: Instrument::AcousticGrandPiano,
            channel: 0,
            velocity: DEFAULT_VELOCITY,
            error,
        }
    }

    /// Instrument for notes added from here on.
    pub fn instrument(&mut self, instrument: Instrument) -> &mut Self {
        self.instrument = instrument;
        self
    }

    /// MIDI channel for notes added from here on.
    pub fn channel(&mut self, channel: u8) -> &mut Self {
        self.channel = channel;
        self
    }

    /// Velocity for notes added from here on.
    pub fn velocity(&mut self, velocity: u8) -> &mut Self {
        self.velocity = velocity;
        self
    }

    /// Advance the cursor without adding anything.
    pub fn rest(&mut self, ms: u32) -> &mut Self {
        if self.error.is_none() {
            self.cursor = self.cursor.saturating_add(ms);
        }
        self
    }

    /// Add a note at the cursor and advance by its duration.
    pub fn note(&mut self, name: &str, dur: u32) -> &mut Self {
        let velocity = self.velocity;
        self.note_vel(name, dur, velocity)
    }

    /// [`note`](Self::note) with an explicit velocity.
    pub fn note_vel(&mut self, name: &str, dur: u32, velocity: u8) -> &mut Self {
        self.add(name, dur, velocity);
        self.rest(dur)
    }

    /// Add notes that start together and advance by `dur`.
    pub fn chord<I, N>(&mut self, names: I, dur: u32) -> &mut Self
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let velocity = self.velocity;
        for name in names {
            self.add(name.as_ref(), dur, velocity);
        }
        self.rest(dur)
    }

    /// Add notes one after another, each `step` ms long.
    pub fn arp<I, N>(&mut self, names: I, step: u32) -> &mut Self
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        for name in names {
            self.note(name.as_ref(), step);
        }
        self
    }

    /// Cursor position: the length composed so far, in ms.
    pub fn length(&self) -> u32 {
        self.cursor
    }

    /// Finish the track, returning its length or the first failure.
    pub fn finish(&mut self) -> Result<u32, ComposeError> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(self.cursor),
        }
    }

    fn add(&mut self, name: &str, dur: u32, velocity: u8) {
        if self.error.is_some() {
            return;
        }
        let note = match name.parse::<Note>() {
            Ok(note) => note,
            Err(source) => {
                self.error = Some(ComposeError::InvalidNote { name: name.to_owned(), source });
                return;
            }
        };
        let event = SeqEvent::new(self.cursor, self.instrument, note, dur)
            .on_channel(self.channel)
            .with_velocity(velocity);
        if let Err(err) = self.sink.add_event(self.track, event) {
            self.error = Some(err.into());
        }
    }
}
