/// Session error types
use encore_core::EncoreError;
use encore_playback::PlaybackError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Core(#[from] EncoreError),

    #[error("Caller is not in a voice channel")]
    NotInVoiceChannel,

    #[error("No session for this guild")]
    NotConnected,

    #[error("No tracks found for '{0}'")]
    NoTracksFound(String),

    #[error("Session closed")]
    SessionClosed,
}

impl SessionError {
    /// Text shown to the user for this error
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Playback(PlaybackError::NothingPlaying) => {
                "No music playing.".to_string()
            }
            SessionError::Playback(PlaybackError::NoHistory | PlaybackError::EmptyHistory) => {
                "No previous song in history.".to_string()
            }
            SessionError::Playback(PlaybackError::EmptyQueue) => "The queue is empty.".to_string(),
            SessionError::Playback(PlaybackError::NotPaused) => {
                "Music is already playing or no music to resume.".to_string()
            }
            SessionError::Core(EncoreError::Connection(reason)) => {
                format!("Could not join your voice channel: {}", reason)
            }
            SessionError::Core(EncoreError::Resolver(reason)) => {
                format!("Search failed: {}", reason)
            }
            SessionError::Core(other) => format!("Something went wrong: {}", other),
            SessionError::NotInVoiceChannel => "You're not in a voice channel!".to_string(),
            SessionError::NotConnected | SessionError::SessionClosed => {
                "I'm not in a voice channel.".to_string()
            }
            SessionError::NoTracksFound(query) => format!("No tracks found for '{}'", query),
        }
    }

    /// Whether the session already told the user about this failure
    pub fn reported_by_session(&self) -> bool {
        matches!(self, SessionError::Playback(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages() {
        assert_eq!(
            SessionError::NoTracksFound("lofi".to_string()).user_message(),
            "No tracks found for 'lofi'"
        );
        assert_eq!(
            SessionError::from(PlaybackError::NoHistory).user_message(),
            "No previous song in history."
        );
        assert_eq!(
            SessionError::NotConnected.user_message(),
            SessionError::SessionClosed.user_message()
        );
        assert_eq!(
            SessionError::from(EncoreError::connection("timeout")).user_message(),
            "Could not join your voice channel: timeout"
        );
    }

    #[test]
    fn only_playback_errors_are_reported_by_session() {
        assert!(SessionError::from(PlaybackError::NothingPlaying).reported_by_session());
        assert!(!SessionError::NotConnected.reported_by_session());
        assert!(!SessionError::from(EncoreError::resolver("down")).reported_by_session());
    }
}
