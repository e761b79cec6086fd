/// Core error types for Encore
use thiserror::Error;

/// Result type alias using `EncoreError`
pub type Result<T> = std::result::Result<T, EncoreError>;

/// Errors reported by the collaborators around the playback core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncoreError {
    /// Voice transport could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Audio backend rejected a command
    #[error("Backend error: {0}")]
    Backend(String),

    /// Track lookup failed
    #[error("Resolver error: {0}")]
    Resolver(String),

    /// The status message no longer exists
    #[error("Display target no longer exists")]
    DisplayGone,

    /// Any other presenter failure
    #[error("Presenter error: {0}")]
    Presenter(String),
}

impl EncoreError {
    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a resolver error
    pub fn resolver(msg: impl Into<String>) -> Self {
        Self::Resolver(msg.into())
    }

    /// Create a presenter error
    pub fn presenter(msg: impl Into<String>) -> Self {
        Self::Presenter(msg.into())
    }

    /// Whether the display handle that caused this error should be dropped
    pub fn invalidates_display(&self) -> bool {
        matches!(self, Self::DisplayGone)
    }
}
