//! Errors surfaced by the sequencer API.

/// Why a pattern edit was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SequencerError {
    #[error("track {track} is out of range (engine has {tracks} tracks)")]
    InvalidTrack { track: usize, tracks: usize },
    #[error("track {track} is full ({capacity} events)")]
    TrackFull { track: usize, capacity: usize },
    #[error("MIDI channel {0} is out of range 0-15")]
    InvalidChannel(u8),
    #[error("velocity {0} is out of range 0-127")]
    InvalidVelocity(u8),
}

/// The voice pool has no free slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("voice pool exhausted")]
pub struct PoolExhausted;
