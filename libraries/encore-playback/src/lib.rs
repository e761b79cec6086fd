//! Encore - Playback State
//!
//! Platform-agnostic playback state machine for one voice session.
//!
//! This crate provides:
//! - FIFO queue with in-place prepend and shuffle
//! - Bounded playback history (default 10 tracks)
//! - Loop modes (Off, Song, Queue)
//! - Transition decisions for track end, stop, failure and "previous"
//! - Clamped volume (0-1000)
//!
//! # Architecture
//!
//! `encore-playback` is completely synchronous:
//! - No dependency on an async runtime
//! - No knowledge of voice transports or chat presenters
//!
//! Sessions wrap a [`PlaybackState`], feed it triggers, and act on the
//! [`Transition`] it hands back.
//!
//! # Example
//!
//! ```rust
//! use encore_core::TrackRef;
//! use encore_playback::{PlaybackState, PlayOutcome, Transition, Trigger};
//!
//! let mut state = PlaybackState::default();
//!
//! let a = TrackRef::new("A", 180_000).with_id("a");
//! let b = TrackRef::new("B", 200_000).with_id("b");
//!
//! assert_eq!(state.request_play(a.clone()), PlayOutcome::Started(a.clone()));
//! assert_eq!(state.request_play(b.clone()), PlayOutcome::Queued { position: 1 });
//!
//! // A reaches its end: B takes over, A moves to history
//! assert_eq!(state.advance(Trigger::TrackFinished), Transition::Play(b.clone()));
//! assert_eq!(state.history().len(), 1);
//!
//! // An explicit stop with nothing queued ends the session
//! assert_eq!(state.advance(Trigger::TrackStopped), Transition::Disconnect);
//! assert!(state.current().is_none());
//! ```

mod error;
mod history;
mod queue;
mod shuffle;
mod state;
mod transition;
pub mod types;
mod volume;

// Public exports
pub use error::{PlaybackError, Result};
pub use history::{History, DEFAULT_HISTORY_SIZE};
pub use queue::Queue;
pub use state::{PlayOutcome, PlaybackSnapshot, PlaybackState, Transition};
pub use transition::{Decision, TransitionEngine};
pub use types::{LoopMode, PlaybackConfig, Trigger};
pub use volume::{Volume, MAX_VOLUME};
