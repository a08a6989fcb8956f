//! Sequencer engine for the VS1053 real-time MIDI mode.
//!
//! A single periodically called tick drives everything: due note-offs are
//! sent, the loop position is computed, and events whose offset has been
//! reached fire through the instrument cache and the protocol encoder.
//! Storage is fixed-size; the tick path never allocates.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bus;
mod config;
mod engine;
mod error;
mod instrument_cache;
mod pattern_store;
mod port;
pub mod protocol;
pub mod scheduler;
mod voice_pool;

pub use bus::{BusWrite, Clock, ControlBus, ManualClock, RecordingBus};
pub use config::{
    EngineConfig, ExhaustionPolicy, DEFAULT_EVENTS_PER_TRACK, DEFAULT_TRACKS, DEFAULT_VOICES,
};
pub use engine::{Engine, BASS_BOOST_MAX};
pub use error::{PoolExhausted, SequencerError};
pub use instrument_cache::InstrumentCache;
pub use pattern_store::{PatternStore, ScheduledEvent, Track};
pub use protocol::{MessageDecoder, MidiMessage};
pub use scheduler::{LoopLength, LoopPosition, RunState};
pub use voice_pool::{VoiceId, VoicePool, VoiceReservation};
