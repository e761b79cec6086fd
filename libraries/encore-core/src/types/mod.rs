//! Domain types for Encore

mod display;
mod ids;
mod track;

pub use display::{DisplayHandle, QueueEntry, QueueView, TrackDisplayData, UNKNOWN_AUTHOR};
pub use ids::{ChannelId, GuildId, TrackId};
pub use track::TrackRef;
