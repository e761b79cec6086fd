//! Playback history tracking
//!
//! Maintains a bounded history of played tracks for "previous" and for
//! restarting the playlist in queue-loop mode.

use crate::error::{PlaybackError, Result};
use crate::queue::Queue;
use encore_core::TrackRef;
use std::collections::VecDeque;

/// Default number of tracks kept
pub const DEFAULT_HISTORY_SIZE: usize = 10;

/// Playback history with bounded size
///
/// Ring buffer: most recent at the back, oldest dropped from the front
/// once `max_size` is exceeded.
#[derive(Debug, Clone)]
pub struct History {
    /// History buffer (most recent = back)
    tracks: VecDeque<TrackRef>,

    /// Maximum history size
    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            tracks: VecDeque::with_capacity(max_size + 1),
            max_size,
        }
    }

    /// Add track to history
    ///
    /// If history is full, oldest tracks are discarded
    pub fn push(&mut self, track: TrackRef) {
        self.tracks.push_back(track);
        while self.tracks.len() > self.max_size {
            self.tracks.pop_front();
        }
    }

    /// Get most recent track (without removing)
    pub fn peek_last(&self) -> Option<&TrackRef> {
        self.tracks.back()
    }

    /// Pop most recent track from history
    ///
    /// # Errors
    /// [`PlaybackError::EmptyHistory`] when nothing has been played yet
    pub fn pop_last(&mut self) -> Result<TrackRef> {
        self.tracks.pop_back().ok_or(PlaybackError::EmptyHistory)
    }

    /// Move every entry onto the front of `queue`, oldest first, and clear
    ///
    /// Afterwards the queue reads `[history oldest..newest, previous queue..]`,
    /// so tracks added after a loop started still play after the restart.
    pub fn drain_into(&mut self, queue: &mut Queue) {
        queue.prepend_all(self.tracks.drain(..));
    }

    /// Get all history tracks (oldest first)
    pub fn get_all(&self) -> Vec<&TrackRef> {
        self.tracks.iter().collect()
    }

    /// Get number of tracks in history
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Get maximum history size
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}
