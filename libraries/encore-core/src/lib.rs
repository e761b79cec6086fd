//! Encore Core
//!
//! Platform-agnostic types, collaborator traits, and error handling for Encore,
//! a voice-channel playback controller.
//!
//! This crate provides the building blocks shared by the playback state machine,
//! the session actors, and the applications that host them.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `TrackRef`, `GuildId`, `ChannelId`, display contracts
//! - **Collaborator Traits**: `AudioBackend`, `TrackResolver`, `Presenter`
//! - **Backend Events**: `BackendEvent`, `EndReason`
//! - **Error Handling**: Unified `EncoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use encore_core::types::{TrackDisplayData, TrackRef};
//!
//! let track = TrackRef::new("Song Title", 185_000).with_author("Some Artist");
//! let display = TrackDisplayData::from_track(&track, "@alice");
//!
//! assert_eq!(display.author, "Some Artist");
//! assert_eq!(display.formatted_duration(), "3:05");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{EncoreError, Result};
pub use events::{BackendEvent, BackendHandle, EndReason};
pub use traits::{AudioBackend, Presenter, TrackResolver};
pub use types::{
    ChannelId, DisplayHandle, GuildId, QueueEntry, QueueView, TrackDisplayData, TrackId, TrackRef,
};
