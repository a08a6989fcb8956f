//! Loop-length policy and position within the loop.
//!
//! The sequencer has no notion of beats: it measures wall-clock time since
//! the start of the current cycle and folds it into the loop every tick.

use core::num::NonZeroU32;

use vsq_ir::Timestamp;

/// How long one loop cycle lasts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopLength {
    /// The longest track decides.
    #[default]
    Auto,
    /// A fixed number of milliseconds, whatever the tracks contain.
    Fixed(NonZeroU32),
    /// Play through once and never wrap.
    Once,
}

impl LoopLength {
    /// `0` selects auto-derive, any other value a fixed length.
    pub fn from_millis(ms: u32) -> Self {
        NonZeroU32::new(ms).map_or(Self::Auto, Self::Fixed)
    }

    /// Effective length given the longest track. Never zero: an empty
    /// pattern in auto mode loops every millisecond. `Once` reports the
    /// longest track but is never folded.
    pub fn resolve(self, longest_track: u32) -> NonZeroU32 {
        match self {
            Self::Fixed(ms) => ms,
            Self::Auto | Self::Once => NonZeroU32::new(longest_track).unwrap_or(NonZeroU32::MIN),
        }
    }
}

/// Transport state of the sequencer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Stopped,
    Running {
        started_at: Timestamp,
        loop_length: LoopLength,
        /// When the current cycle began.
        cycle_start: Timestamp,
        /// Cycles completed since start.
        cycle: u32,
    },
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// Where a tick falls in the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopPosition {
    /// Cycles completed since `cycle_start`
    pub cycle: u32,
    /// Milliseconds into the current cycle, in `[0, length)`
    pub position: u32,
    /// Effective loop length used
    pub length: u32,
}

/// Fold the time elapsed since `cycle_start` into the loop.
///
/// The length is resolved against the tracks as they are now, so a track
/// that grows mid-cycle extends the current cycle instead of wrapping it.
pub fn loop_position(
    cycle_start: Timestamp,
    now: Timestamp,
    loop_length: LoopLength,
    longest_track: u32,
) -> LoopPosition {
    let elapsed = now.elapsed_since(cycle_start);
    let length = loop_length.resolve(longest_track);
    if loop_length == LoopLength::Once {
        return LoopPosition { cycle: 0, position: elapsed, length: length.get() };
    }
    LoopPosition {
        cycle: elapsed / length,
        position: elapsed % length,
        length: length.get(),
    }
}

/// Start of the cycle `pos` falls in, given the previous cycle start.
pub fn advance_cycle_start(cycle_start: Timestamp, pos: &LoopPosition) -> Timestamp {
    cycle_start.add_millis(pos.cycle.wrapping_mul(pos.length))
}
