/// Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};

/// A resolved, playable item
///
/// Immutable once resolved. Queues and histories hold their own copies,
/// so two sessions never share mutable track state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    /// Opaque identifier understood by the audio backend
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Author or artist, when the source knows it
    pub author: Option<String>,

    /// Track duration in milliseconds
    pub duration_ms: u64,

    /// Artwork URL
    pub artwork: Option<String>,
}

impl TrackRef {
    /// Create a new track with minimal metadata and a random ID
    pub fn new(title: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            id: TrackId::generate(),
            title: title.into(),
            author: None,
            duration_ms,
            artwork: None,
        }
    }

    /// Replace the identifier
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = TrackId::new(id);
        self
    }

    /// Set the author
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the artwork URL
    #[must_use]
    pub fn with_artwork(mut self, artwork: impl Into<String>) -> Self {
        self.artwork = Some(artwork.into());
        self
    }
}
