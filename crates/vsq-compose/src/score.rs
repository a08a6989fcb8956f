//! RON score documents.
//!
//! ```ron
//! (
//!     loop_ms: 0,
//!     tracks: [
//!         (
//!             track: 0,
//!             instrument: Marimba,
//!             steps: [
//!                 Note(name: "C4", dur: 250),
//!                 Chord(names: ["C4", "E4", "G4"], dur: 500),
//!                 Rest(250),
//!             ],
//!         ),
//!     ],
//! )
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use vsq_ir::Instrument;

use crate::composer::{TrackComposer, DEFAULT_VELOCITY};
use crate::error::ComposeError;
use crate::sink::PatternSink;

/// A complete multi-track score.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Loop length in ms; 0 loops over the longest track.
    #[serde(default)]
    pub loop_ms: u32,
    pub tracks: Vec<ScoreTrack>,
}

/// One track of a score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreTrack {
    pub track: usize,
    #[serde(default)]
    pub channel: u8,
    #[serde(default)]
    pub instrument: Instrument,
    #[serde(default = "default_velocity")]
    pub velocity: u8,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One step of a track, played at the track's time cursor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Step {
    Note {
        name: String,
        dur: u32,
        #[serde(default)]
        vel: Option<u8>,
    },
    Chord { names: Vec<String>, dur: u32 },
    Arp { names: Vec<String>, step: u32 },
    Rest(u32),
}

fn default_velocity() -> u8 {
    DEFAULT_VELOCITY
}

impl Score {
    /// Parse a score from RON text.
    pub fn from_ron(text: &str) -> Result<Self, ComposeError> {
        Ok(ron::from_str(text)?)
    }

    /// Write every track into `sink`, replacing what the tracks held.
    ///
    /// Returns the length of the longest track.
    pub fn apply<S: PatternSink + ?Sized>(&self, sink: &mut S) -> Result<u32, ComposeError> {
        let mut longest = 0;
        for track in &self.tracks {
            let mut composer = TrackComposer::new(&mut *sink, track.track);
            composer
                .instrument(track.instrument)
                .channel(track.channel)
                .velocity(track.velocity);
            for step in &track.steps {
                match step {
                    Step::Note { name, dur, vel } => match vel {
                        Some(vel) => composer.note_vel(name, *dur, *vel),
                        None => composer.note(name, *dur),
                    },
                    Step::Chord { names, dur } => composer.chord(names, *dur),
                    Step::Arp { names, step } => composer.arp(names, *step),
                    Step::Rest(ms) => composer.rest(*ms),
                };
            }
            let length = composer.finish()?;
            debug!(track = track.track, steps = track.steps.len(), length, "track composed");
            longest = longest.max(length);
        }
        Ok(longest)
    }
}
