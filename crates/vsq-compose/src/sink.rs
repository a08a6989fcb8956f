//! What a composer writes into.

use vsq_engine::{Clock, ControlBus, Engine, PatternStore, SequencerError};
use vsq_ir::SeqEvent;

/// Anything that holds tracks of events.
pub trait PatternSink {
    fn clear_track(&mut self, track: usize) -> Result<(), SequencerError>;
    fn add_event(&mut self, track: usize, event: SeqEvent) -> Result<(), SequencerError>;
}

impl<B, C, const TRACKS: usize, const EVENTS: usize, const VOICES: usize> PatternSink
    for Engine<B, C, TRACKS, EVENTS, VOICES>
where
    B: ControlBus,
    C: Clock,
{
    fn clear_track(&mut self, track: usize) -> Result<(), SequencerError> {
        Engine::clear_track(self, track)
    }

    fn add_event(&mut self, track: usize, event: SeqEvent) -> Result<(), SequencerError> {
        Engine::add_event(self, track, event)
    }
}

impl<const TRACKS: usize, const EVENTS: usize> PatternSink for PatternStore<TRACKS, EVENTS> {
    fn clear_track(&mut self, track: usize) -> Result<(), SequencerError> {
        self.clear(track)
    }

    fn add_event(&mut self, track: usize, event: SeqEvent) -> Result<(), SequencerError> {
        self.append(track, event)
    }
}
