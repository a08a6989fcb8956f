//! Sequenced note events.

use crate::instrument::Instrument;
use crate::note::Note;

/// A note scheduled on a track, relative to the start of the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeqEvent {
    /// Milliseconds from track start
    pub offset: u32,
    /// MIDI channel (0-15)
    pub channel: u8,
    /// Program selected before the note sounds
    pub instrument: Instrument,
    /// Pitch
    pub note: Note,
    /// Note-on velocity (0-127)
    pub velocity: u8,
    /// Milliseconds until the note-off, at most [`MAX_DURATION_MS`](crate::MAX_DURATION_MS)
    /// when played
    pub duration: u32,
}

impl SeqEvent {
    /// Create an event on channel 0 with velocity 110.
    pub fn new(offset: u32, instrument: Instrument, note: Note, duration: u32) -> Self {
        Self {
            offset,
            channel: 0,
            instrument,
            note,
            velocity: 110,
            duration,
        }
    }

    /// Set the channel.
    pub fn on_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    /// Set the velocity.
    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity;
        self
    }

    /// Time at which the note-off is due, relative to track start.
    pub fn end(&self) -> u32 {
        self.offset.saturating_add(self.duration)
    }
}
