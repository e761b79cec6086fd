//! Transition decisions
//!
//! Pure logic: looks at a [`PlaybackState`] and a [`Trigger`] and says what
//! should happen next. It never mutates anything; [`PlaybackState::apply`]
//! carries the decision out.
//!
//! For `TrackFinished`:
//! 1. Song loop with a current track replays it.
//! 2. Otherwise the queue head plays next.
//! 3. Otherwise, in queue loop with history, history is drained back into the
//!    queue and the decision is retried.
//! 4. Otherwise the session disconnects.
//!
//! `TrackStopped` runs the same steps only while the queue has tracks; an
//! explicit stop on an empty queue always disconnects, whatever the loop mode.

use crate::error::{PlaybackError, Result};
use crate::state::PlaybackState;
use crate::types::{LoopMode, Trigger};
use encore_core::TrackRef;

/// Outcome of a transition decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Replay the current track unchanged
    ReplayCurrent,

    /// Promote the queue head to current; old current goes to history
    PlayNext(TrackRef),

    /// Move history back into the queue, then decide again
    DrainAndPlayNext,

    /// Nothing left to play
    Disconnect,

    /// Play this track directly; old current goes back to the queue front
    PlayGivenTrack(TrackRef),
}

/// Decision logic for track transitions
pub struct TransitionEngine;

impl TransitionEngine {
    /// Decide what follows `trigger`
    pub fn decide(state: &PlaybackState, trigger: Trigger) -> Decision {
        match trigger {
            Trigger::StopRequested => return Decision::Disconnect,
            Trigger::TrackStopped if state.queue().is_empty() => return Decision::Disconnect,
            // A broken track is never replayed, even in song loop
            Trigger::TrackFailed => {
                return state
                    .queue()
                    .front()
                    .cloned()
                    .map_or(Decision::Disconnect, Decision::PlayNext);
            }
            Trigger::TrackFinished | Trigger::TrackStopped => {}
        }

        if state.loop_mode() == LoopMode::Song && state.current().is_some() {
            return Decision::ReplayCurrent;
        }

        if let Some(next) = state.queue().front() {
            return Decision::PlayNext(next.clone());
        }

        if state.loop_mode() == LoopMode::Queue && !state.history().is_empty() {
            return Decision::DrainAndPlayNext;
        }

        Decision::Disconnect
    }

    /// Decide what "previous" plays
    ///
    /// # Errors
    /// [`PlaybackError::NoHistory`] when history is empty
    pub fn decide_previous(state: &PlaybackState) -> Result<Decision> {
        state
            .history()
            .peek_last()
            .cloned()
            .map(Decision::PlayGivenTrack)
            .ok_or(PlaybackError::NoHistory)
    }
}
