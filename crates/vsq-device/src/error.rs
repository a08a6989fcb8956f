//! Device error types.

/// Error type for device bring-up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// A plugin record announces more values than the blob holds
    #[error("plugin blob truncated in record starting at word {offset}")]
    TruncatedPlugin { offset: usize },
}
