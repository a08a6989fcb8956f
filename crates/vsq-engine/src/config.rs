//! Engine capacities and runtime policy.

/// Default number of tracks.
pub const DEFAULT_TRACKS: usize = 8;
/// Default per-track event capacity.
pub const DEFAULT_EVENTS_PER_TRACK: usize = 128;
/// Default number of concurrently tracked voices.
pub const DEFAULT_VOICES: usize = 32;

/// What to do with a note whose off-message cannot be scheduled because the
/// voice pool is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExhaustionPolicy {
    /// Leave the note sounding; nothing will turn it off.
    #[default]
    Drop,
    /// Send the note-off right after the note-on.
    ForceOff,
}

/// Runtime configuration of an [`Engine`](crate::Engine).
///
/// Capacities are const generic parameters of the engine, not part of
/// this struct, so storage stays fixed-size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub exhaustion: ExhaustionPolicy,
}

impl EngineConfig {
    pub fn with_exhaustion(mut self, exhaustion: ExhaustionPolicy) -> Self {
        self.exhaustion = exhaustion;
        self
    }
}
