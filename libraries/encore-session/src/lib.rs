//! Encore - Playback Sessions
//!
//! Runs one playback session per guild on top of `encore-playback`.
//!
//! This crate provides:
//! - A session actor per voice connection, fed through a single mailbox
//! - A backend command worker so backend latency never blocks the session
//! - A transition barrier: commands issued while a skip is in flight wait
//!   for the backend's `TrackEnded` and then run in arrival order
//! - A registry that maps guilds to sessions, stamps each connection with an
//!   epoch and drops backend events from older connections
//! - Parsing of user command text
//!
//! # Example
//!
//! ```rust,ignore
//! use encore_session::{CommandContext, SessionRegistry, UserCommand};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(SessionRegistry::new(backend, resolver, presenter, config));
//! registry.clone().spawn_event_pump(backend_events);
//!
//! let command: UserCommand = "play never gonna give you up".parse()?;
//! registry.dispatch(&ctx, command).await?;
//! ```

#![forbid(unsafe_code)]

pub mod command;
pub mod error;
pub mod registry;
pub mod session;
mod worker;

pub use command::{CommandContext, ParseCommandError, UserCommand};
pub use error::{Result, SessionError};
pub use registry::{JoinOutcome, SessionRegistry};
pub use session::{PlaybackSession, SessionHandle, SessionSnapshot, QUEUE_REQUESTER};
