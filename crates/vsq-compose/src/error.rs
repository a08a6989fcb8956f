//! Composer error types.

use vsq_engine::SequencerError;
use vsq_ir::NoteParseError;

/// Error type for composing patterns.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("invalid note name '{name}': {source}")]
    InvalidNote {
        name: String,
        #[source]
        source: NoteParseError,
    },
    #[error(transparent)]
    Sequencer(#[from] SequencerError),
    #[error("score parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}
