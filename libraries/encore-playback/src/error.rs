//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Queue is empty
    #[error("Queue is empty")]
    EmptyQueue,

    /// History is empty
    #[error("History is empty")]
    EmptyHistory,

    /// No current track
    #[error("Nothing is playing")]
    NothingPlaying,

    /// "Previous" requested with no history to go back to
    #[error("No previous track in history")]
    NoHistory,

    /// Resume requested while not paused
    #[error("Playback is not paused")]
    NotPaused,
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
