//! Audio backend events
//!
//! The backend reports track lifecycle changes asynchronously. Each event
//! carries the [`BackendHandle`] the command was issued on, so events that
//! outlive their session can be recognised and dropped.

use crate::types::{ChannelId, GuildId, TrackId};
use serde::{Deserialize, Serialize};

/// Handle to one voice connection
///
/// `epoch` distinguishes successive connections for the same guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackendHandle {
    /// Guild the connection belongs to
    pub guild: GuildId,

    /// Voice channel joined
    pub channel: ChannelId,

    /// Connection counter, unique per registry
    pub epoch: u64,
}

impl BackendHandle {
    /// Create a handle with epoch 0
    pub fn new(guild: GuildId, channel: ChannelId) -> Self {
        Self {
            guild,
            channel,
            epoch: 0,
        }
    }

    /// Stamp the handle with a connection epoch
    #[must_use]
    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }
}

/// Why a track stopped producing audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Reached the end naturally
    Finished,

    /// Stopped by an explicit stop/skip
    Stopped,

    /// Another play command replaced it
    Replaced,

    /// Failed to load or broke mid-stream
    Error,
}

/// Events emitted by an audio backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendEvent {
    /// A track stopped producing audio
    TrackEnded {
        /// Connection the track was playing on
        handle: BackendHandle,
        /// Track that ended
        track_id: TrackId,
        /// Why it ended
        reason: EndReason,
    },
}

impl BackendEvent {
    /// Handle the event belongs to
    pub fn handle(&self) -> BackendHandle {
        match self {
            Self::TrackEnded { handle, .. } => *handle,
        }
    }
}
