//! Playback state - per-session data and the operations on it
//!
//! Owns the queue, history, current slot, loop mode and volume for one
//! session. Everything here is synchronous; the async session actor wraps a
//! `PlaybackState` and turns the returned outcomes into backend and
//! presenter calls.

use crate::{
    error::{PlaybackError, Result},
    history::{History, DEFAULT_HISTORY_SIZE},
    queue::Queue,
    transition::{Decision, TransitionEngine},
    types::{LoopMode, PlaybackConfig, Trigger},
    volume::{Volume, MAX_VOLUME},
};
use encore_core::types::UNKNOWN_AUTHOR;
use encore_core::{QueueEntry, QueueView, TrackRef};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Result of a play request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Nothing was playing; the track is now current
    Started(TrackRef),

    /// Something was playing; the track was queued at this 1-based position
    Queued { position: usize },
}

/// What the session has to do after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Play the current track again
    Replay(TrackRef),

    /// Start this track; it is already current
    Play(TrackRef),

    /// Tear the session down; state has been reset
    Disconnect,
}

impl Transition {
    /// Track the backend should start, if any
    pub fn track(&self) -> Option<&TrackRef> {
        match self {
            Transition::Replay(track) | Transition::Play(track) => Some(track),
            Transition::Disconnect => None,
        }
    }
}

/// Owned copy of the whole state, for status views and tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub current: Option<TrackRef>,
    pub queue: Vec<TrackRef>,
    pub history: Vec<TrackRef>,
    pub loop_mode: LoopMode,
    pub volume: u16,
    pub paused: bool,
}

/// Per-session playback state
#[derive(Debug, Clone)]
pub struct PlaybackState {
    queue: Queue,
    history: History,

    /// Track loaded in the backend; never also in `queue`
    current: Option<TrackRef>,

    loop_mode: LoopMode,
    volume: Volume,
    paused: bool,
    config: PlaybackConfig,
}

impl PlaybackState {
    /// Create new playback state
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            queue: Queue::new(),
            history: History::new(config.history_size.min(DEFAULT_HISTORY_SIZE)),
            current: None,
            loop_mode: LoopMode::Off,
            volume: Volume::new(config.default_volume, config.max_volume.min(MAX_VOLUME)),
            paused: false,
            config,
        }
    }

    // ===== Requests =====

    /// Play a track now if idle, otherwise queue it
    pub fn request_play(&mut self, track: TrackRef) -> PlayOutcome {
        if self.current.is_none() {
            debug!(track = %track.id, "Starting track on idle session");
            self.current = Some(track.clone());
            self.paused = false;
            PlayOutcome::Started(track)
        } else {
            debug!(track = %track.id, "Queueing track");
            self.queue.enqueue(track);
            PlayOutcome::Queued {
                position: self.queue.len(),
            }
        }
    }

    /// Run the transition for `trigger` to completion
    ///
    /// Drains history and retries when the engine asks for it. Never fails:
    /// an inconsistent state is reset and reported as `Disconnect`.
    pub fn advance(&mut self, trigger: Trigger) -> Transition {
        // A track that failed to play never enters history
        if trigger == Trigger::TrackFailed {
            if let Some(failed) = self.current.take() {
                debug!(track = %failed.id, "Dropping failed track");
            }
        }

        loop {
            let decision = TransitionEngine::decide(self, trigger);
            debug!(?trigger, ?decision, "Transition decided");

            match self.apply(decision) {
                Ok(Some(transition)) => return transition,
                Ok(None) => {}
                Err(e) => {
                    warn!("Transition failed ({}), resetting session state", e);
                    self.reset();
                    return Transition::Disconnect;
                }
            }
        }
    }

    /// Carry out a decision
    ///
    /// Returns `Ok(None)` after a history drain, meaning the caller must
    /// decide again.
    ///
    /// # Errors
    /// `EmptyQueue`, `EmptyHistory` or `NothingPlaying` when the decision
    /// does not match the state it is applied to.
    pub fn apply(&mut self, decision: Decision) -> Result<Option<Transition>> {
        match decision {
            Decision::ReplayCurrent => {
                let track = self.current.clone().ok_or(PlaybackError::NothingPlaying)?;
                self.paused = false;
                Ok(Some(Transition::Replay(track)))
            }
            Decision::PlayNext(expected) => {
                let next = self.queue.dequeue_front()?;
                debug_assert_eq!(next.id, expected.id);
                if let Some(finished) = self.current.take() {
                    self.history.push(finished);
                }
                self.current = Some(next.clone());
                self.paused = false;
                Ok(Some(Transition::Play(next)))
            }
            Decision::DrainAndPlayNext => {
                debug!(
                    restored = self.history.len(),
                    "Restarting playlist from history"
                );
                self.history.drain_into(&mut self.queue);
                Ok(None)
            }
            Decision::Disconnect => {
                self.reset();
                Ok(Some(Transition::Disconnect))
            }
            Decision::PlayGivenTrack(expected) => {
                let track = self.history.pop_last()?;
                debug_assert_eq!(track.id, expected.id);
                if let Some(interrupted) = self.current.take() {
                    self.queue.prepend(interrupted);
                }
                self.current = Some(track.clone());
                self.paused = false;
                Ok(Some(Transition::Play(track)))
            }
        }
    }

    /// Go back to the most recent history entry
    ///
    /// The interrupted track goes to the front of the queue, not to history.
    ///
    /// # Errors
    /// [`PlaybackError::NoHistory`] when there is nothing to go back to
    pub fn previous(&mut self) -> Result<TrackRef> {
        let decision = TransitionEngine::decide_previous(self)?;
        match self.apply(decision) {
            Ok(Some(Transition::Play(track))) => Ok(track),
            Ok(_) | Err(PlaybackError::EmptyHistory) => Err(PlaybackError::NoHistory),
            Err(e) => Err(e),
        }
    }

    /// Fail unless a track is current
    pub fn ensure_playing(&self) -> Result<&TrackRef> {
        self.current.as_ref().ok_or(PlaybackError::NothingPlaying)
    }

    /// Mark the current track paused
    ///
    /// # Errors
    /// [`PlaybackError::NothingPlaying`] when idle or already paused
    pub fn pause(&mut self) -> Result<()> {
        if self.current.is_none() || self.paused {
            return Err(PlaybackError::NothingPlaying);
        }
        self.paused = true;
        Ok(())
    }

    /// Clear the paused flag
    ///
    /// # Errors
    /// [`PlaybackError::NotPaused`] unless paused
    pub fn resume(&mut self) -> Result<()> {
        if !self.paused {
            return Err(PlaybackError::NotPaused);
        }
        self.paused = false;
        Ok(())
    }

    /// Shuffle the pending queue in place
    pub fn shuffle(&mut self) {
        self.queue.shuffle();
    }

    // ===== Loop & Volume =====

    /// Advance Off -> Song -> Queue -> Off
    pub fn cycle_loop_mode(&mut self) -> LoopMode {
        self.loop_mode = self.loop_mode.next();
        self.loop_mode
    }

    /// Set loop mode explicitly
    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    /// Shift volume by `delta`, clamped
    pub fn adjust_volume(&mut self, delta: i32) -> u16 {
        self.volume.adjust(delta)
    }

    /// Raise volume by the configured step
    pub fn volume_up(&mut self) -> u16 {
        self.adjust_volume(i32::from(self.config.volume_step))
    }

    /// Lower volume by the configured step
    pub fn volume_down(&mut self) -> u16 {
        self.adjust_volume(-i32::from(self.config.volume_step))
    }

    /// Forget queue, history, current track and loop mode
    ///
    /// Volume survives; it belongs to the listener, not the playlist.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.history.clear();
        self.current = None;
        self.loop_mode = LoopMode::Off;
        self.paused = false;
    }

    // ===== State Queries =====

    /// Current track and upcoming queue, trimmed to the display limit
    pub fn queue_view(&self) -> QueueView {
        let limit = self.config.queue_display_limit;
        let total = usize::from(self.current.is_some()) + self.queue.len();

        let entries = self
            .current
            .iter()
            .map(|track| (track, true))
            .chain(self.queue.iter().map(|track| (track, false)))
            .take(limit)
            .enumerate()
            .map(|(i, (track, now_playing))| QueueEntry {
                position: i + 1,
                title: track.title.clone(),
                author: track
                    .author
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
                now_playing,
            })
            .collect::<Vec<_>>();

        QueueView {
            overflow: total - entries.len(),
            entries,
        }
    }

    /// Owned copy of everything
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current: self.current.clone(),
            queue: self.queue.snapshot(),
            history: self.history.get_all().into_iter().cloned().collect(),
            loop_mode: self.loop_mode,
            volume: self.volume.level(),
            paused: self.paused,
        }
    }

    /// Get currently playing track
    pub fn current(&self) -> Option<&TrackRef> {
        self.current.as_ref()
    }

    /// Get pending queue
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Get playback history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Get loop mode
    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    /// Get volume level
    pub fn volume(&self) -> u16 {
        self.volume.level()
    }

    /// Whether the current track is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Get configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}
