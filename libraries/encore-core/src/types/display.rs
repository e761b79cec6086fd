//! Display contracts handed to the presenter
//!
//! The playback core never renders anything itself. It hands these
//! structured values to a [`crate::Presenter`] which owns formatting.

use crate::types::{ChannelId, TrackRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author label used when a track has none
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Reference to a status message previously sent by the presenter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayHandle {
    /// Channel the message lives in
    pub channel: ChannelId,

    /// Presenter-specific message identifier
    pub message_id: String,
}

impl DisplayHandle {
    /// Create a new display handle
    pub fn new(channel: ChannelId, message_id: impl Into<String>) -> Self {
        Self {
            channel,
            message_id: message_id.into(),
        }
    }
}

/// Everything a now-playing view needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDisplayData {
    /// Track title
    pub title: String,

    /// Author, or [`UNKNOWN_AUTHOR`]
    pub author: String,

    /// Length in milliseconds
    pub duration_ms: u64,

    /// Artwork URL, if the source has one
    pub artwork: Option<String>,

    /// Who asked for the track (a user mention, or the queue itself)
    pub requested_by: String,

    /// When the track started
    pub requested_at: DateTime<Utc>,
}

impl TrackDisplayData {
    /// Build display data for a track, stamped with the current time
    pub fn from_track(track: &TrackRef, requested_by: impl Into<String>) -> Self {
        Self {
            title: track.title.clone(),
            author: track
                .author
                .clone()
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            duration_ms: track.duration_ms,
            artwork: track.artwork.clone(),
            requested_by: requested_by.into(),
            requested_at: Utc::now(),
        }
    }

    /// Duration as `m:ss`
    pub fn formatted_duration(&self) -> String {
        let total_seconds = self.duration_ms / 1000;
        format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
    }
}

/// One line of the queue view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// 1-based position in the view
    pub position: usize,

    /// Track title
    pub title: String,

    /// Author, or [`UNKNOWN_AUTHOR`]
    pub author: String,

    /// Whether this entry is the current track
    pub now_playing: bool,
}

impl QueueEntry {
    /// Single-line label, e.g. `**Song** by Artist`
    pub fn label(&self) -> String {
        if self.now_playing {
            format!("**Now Playing:** **{}** by {}", self.title, self.author)
        } else {
            format!("**{}** by {}", self.title, self.author)
        }
    }
}

/// Read-only view of the current track and upcoming queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueView {
    /// Up to the display limit, current track first
    pub entries: Vec<QueueEntry>,

    /// Entries left out of `entries`
    pub overflow: usize,
}

impl QueueView {
    /// Whether there is nothing to show
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
