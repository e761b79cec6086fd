//! Pending-track queue
//!
//! FIFO for normal playback, backed by a `VecDeque` so that "previous"
//! (insert at front), history restarts and shuffling all happen in place.
//!
//! The currently playing track never lives here; it sits in the session's
//! `current` slot.

use crate::error::{PlaybackError, Result};
use crate::shuffle::shuffle_tracks;
use encore_core::TrackRef;
use rand::Rng;
use std::collections::VecDeque;

/// Ordered queue of pending tracks
#[derive(Debug, Clone, Default)]
pub struct Queue {
    tracks: VecDeque<TrackRef>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append track to the tail
    pub fn enqueue(&mut self, track: TrackRef) {
        self.tracks.push_back(track);
    }

    /// Remove and return the head
    ///
    /// # Errors
    /// [`PlaybackError::EmptyQueue`] when there is nothing queued
    pub fn dequeue_front(&mut self) -> Result<TrackRef> {
        self.tracks.pop_front().ok_or(PlaybackError::EmptyQueue)
    }

    /// Insert track at the head, ahead of everything else
    pub fn prepend(&mut self, track: TrackRef) {
        self.tracks.push_front(track);
    }

    /// Insert tracks at the head, keeping their relative order
    ///
    /// `[a, b]` onto `[x]` gives `[a, b, x]`.
    pub fn prepend_all(&mut self, tracks: impl IntoIterator<Item = TrackRef>) {
        let incoming: Vec<TrackRef> = tracks.into_iter().collect();
        for track in incoming.into_iter().rev() {
            self.tracks.push_front(track);
        }
    }

    /// Peek at the head without removing it
    pub fn front(&self) -> Option<&TrackRef> {
        self.tracks.front()
    }

    /// Iterate front to back
    pub fn iter(&self) -> impl Iterator<Item = &TrackRef> {
        self.tracks.iter()
    }

    /// Owned, ordered copy for display
    pub fn snapshot(&self) -> Vec<TrackRef> {
        self.tracks.iter().cloned().collect()
    }

    /// Randomly permute all tracks in place
    ///
    /// No-op on an empty queue.
    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::thread_rng());
    }

    /// Shuffle with a caller-supplied RNG
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        shuffle_tracks(self.tracks.make_contiguous(), rng);
    }

    /// Remove all tracks
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Number of queued tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
