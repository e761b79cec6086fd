/// Collaborator traits for Encore
///
/// The playback core talks to the outside world only through these three
/// seams. Implementations live in applications (or in test fakes).
use crate::error::Result;
use crate::events::BackendHandle;
use crate::types::{ChannelId, DisplayHandle, QueueView, TrackDisplayData, TrackRef};
use async_trait::async_trait;

/// Voice transport and audio streaming
///
/// Every command except `connect` is fire-and-observe: returning `Ok` only
/// means the backend accepted the command. Completion is reported later
/// through [`crate::BackendEvent`]s.
///
/// A guild can be reconnected while commands for its previous connection
/// are still in flight. Those carry an older `epoch` and must not touch the
/// newer connection.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Open the voice connection described by `handle`
    ///
    /// Replaces any earlier connection for the same guild.
    ///
    /// # Errors
    /// Returns [`crate::EncoreError::Connection`] if the transport cannot be reached
    async fn connect(&self, handle: &BackendHandle) -> Result<()>;

    /// Start playing a track, replacing whatever is loaded
    async fn play(&self, handle: &BackendHandle, track: &TrackRef) -> Result<()>;

    /// Pause (`true`) or resume (`false`)
    async fn pause(&self, handle: &BackendHandle, paused: bool) -> Result<()>;

    /// Stop the loaded track; the backend answers with `EndReason::Stopped`
    async fn stop(&self, handle: &BackendHandle) -> Result<()>;

    /// Set output volume (0-1000, 1000 = 100%)
    async fn set_volume(&self, handle: &BackendHandle, volume: u16) -> Result<()>;

    /// Tear down the voice connection
    async fn disconnect(&self, handle: &BackendHandle) -> Result<()>;
}

/// Free-text track search
#[async_trait]
pub trait TrackResolver: Send + Sync {
    /// Search for tracks, best match first
    ///
    /// An empty result is not an error.
    async fn search(&self, query: &str) -> Result<Vec<TrackRef>>;
}

/// User-facing output
///
/// Failures are never fatal to a session. A [`crate::EncoreError::DisplayGone`]
/// tells the caller to forget the handle it used.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Post a new now-playing status
    async fn show_now_playing(
        &self,
        channel: ChannelId,
        data: &TrackDisplayData,
    ) -> Result<DisplayHandle>;

    /// Edit an existing now-playing status in place
    async fn update_now_playing(
        &self,
        handle: &DisplayHandle,
        data: &TrackDisplayData,
    ) -> Result<()>;

    /// Show the queue listing
    async fn show_queue(&self, channel: ChannelId, view: &QueueView) -> Result<()>;

    /// Show a plain text message
    async fn show_message(&self, channel: ChannelId, text: &str) -> Result<()>;

    /// Turn a now-playing status into its terminal "disconnected" state
    async fn show_disconnected(&self, handle: &DisplayHandle) -> Result<()>;
}
