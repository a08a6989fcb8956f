//! Fixed-capacity tracks of sequenced events.

use heapless::Vec;
use vsq_ir::{SeqEvent, MIDI_CHANNELS, MIDI_DATA_MAX};

use crate::error::SequencerError;

/// An event plus its fired-this-cycle flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub event: SeqEvent,
    /// Set once the event has sounded in the current loop cycle.
    pub fired: bool,
}

/// One track: events in append order and the length they span.
#[derive(Clone, Debug, Default)]
pub struct Track<const EVENTS: usize> {
    events: Vec<ScheduledEvent, EVENTS>,
    loop_length: u32,
}

impl<const EVENTS: usize> Track<EVENTS> {
    pub const fn new() -> Self {
        Self { events: Vec::new(), loop_length: 0 }
    }

    /// End of the latest-ending event, in ms from track start.
    pub fn loop_length(&self) -> u32 {
        self.loop_length
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[ScheduledEvent] {
        &self.events
    }

    pub(crate) fn events_mut(&mut self) -> &mut [ScheduledEvent] {
        &mut self.events
    }

    fn clear(&mut self) {
        self.events.clear();
        self.loop_length = 0;
    }
}

/// `TRACKS` tracks of up to `EVENTS` events each.
#[derive(Clone, Debug)]
pub struct PatternStore<const TRACKS: usize, const EVENTS: usize> {
    tracks: [Track<EVENTS>; TRACKS],
}

impl<const TRACKS: usize, const EVENTS: usize> PatternStore<TRACKS, EVENTS> {
    pub fn new() -> Self {
        Self { tracks: core::array::from_fn(|_| Track::new()) }
    }

    pub fn track(&self, track: usize) -> Result<&Track<EVENTS>, SequencerError> {
        self.tracks.get(track).ok_or(SequencerError::InvalidTrack { track, tracks: TRACKS })
    }

    fn track_mut(&mut self, track: usize) -> Result<&mut Track<EVENTS>, SequencerError> {
        self.tracks
            .get_mut(track)
            .ok_or(SequencerError::InvalidTrack { track, tracks: TRACKS })
    }

    /// Remove every event from a track and reset its length.
    pub fn clear(&mut self, track: usize) -> Result<(), SequencerError> {
        self.track_mut(track)?.clear();
        Ok(())
    }

    /// Append an event, armed, and extend the track's length to cover it.
    ///
    /// On error the track is left as it was.
    pub fn append(&mut self, track: usize, event: SeqEvent) -> Result<(), SequencerError> {
        if event.channel as usize >= MIDI_CHANNELS {
            return Err(SequencerError::InvalidChannel(event.channel));
        }
        if event.velocity > MIDI_DATA_MAX {
            return Err(SequencerError::InvalidVelocity(event.velocity));
        }
        let t = self.track_mut(track)?;
        t.events
            .push(ScheduledEvent { event, fired: false })
            .map_err(|_| SequencerError::TrackFull { track, capacity: EVENTS })?;
        t.loop_length = t.loop_length.max(event.end());
        Ok(())
    }

    /// Longest track length; 0 when every track is empty.
    pub fn max_loop_length(&self) -> u32 {
        self.tracks.iter().map(|t| t.loop_length()).max().unwrap_or(0)
    }

    /// Total number of events across all tracks.
    pub fn event_count(&self) -> usize {
        self.tracks.iter().map(|t| t.len()).sum()
    }

    /// Mark every event as not yet fired.
    pub fn rearm_all(&mut self) {
        for t in &mut self.tracks {
            for slot in t.events_mut() {
                slot.fired = false;
            }
        }
    }

    pub fn tracks(&self) -> &[Track<EVENTS>] {
        &self.tracks
    }

    pub(crate) fn tracks_mut(&mut self) -> &mut [Track<EVENTS>] {
        &mut self.tracks
    }
}

impl<const TRACKS: usize, const EVENTS: usize> Default for PatternStore<TRACKS, EVENTS> {
    fn default() -> Self {
        Self::new()
    }
}
