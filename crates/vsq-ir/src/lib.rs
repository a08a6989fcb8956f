//! Core data types for the vsq sequencer.
//!
//! This crate defines the values shared by the engine, the composer and the
//! device layer: General MIDI instruments, MIDI pitches, sequenced events and
//! the wrapping millisecond clock.
//!
//! Designed to be `no_std` compatible.

#![cfg_attr(not(feature = "std"), no_std)]

mod event;
mod instrument;
mod note;
mod timestamp;

pub use event::SeqEvent;
pub use instrument::Instrument;
pub use note::{Note, NoteParseError};
pub use timestamp::{Timestamp, MAX_DURATION_MS};

/// Number of MIDI channels addressable on the device.
pub const MIDI_CHANNELS: usize = 16;

/// Highest valid MIDI data byte (velocity, pitch, controller value).
pub const MIDI_DATA_MAX: u8 = 127;
