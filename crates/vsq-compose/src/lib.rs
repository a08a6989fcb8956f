//! Composer DSL and score files for the vsq sequencer.
//!
//! Builds pattern-store content from note names, chords, arpeggios and
//! rests, either in code through [`Song`] / [`TrackComposer`] or from a RON
//! [`Score`] document.

mod composer;
mod error;
mod score;
mod sink;

pub use composer::{Song, TrackComposer, DEFAULT_VELOCITY};
pub use error::ComposeError;
pub use score::{Score, ScoreTrack, Step};
pub use sink::PatternSink;
