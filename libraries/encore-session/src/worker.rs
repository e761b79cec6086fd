//! Backend command worker
//!
//! Backend calls are asynchronous and may be slow. The session never awaits
//! them; it submits [`BackendCommand`]s to this worker, which runs them in
//! order on its own task. Failures that the session must react to come back
//! through the session mailbox.

use crate::session::SessionMessage;
use encore_core::{AudioBackend, BackendHandle, TrackId, TrackRef};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One backend call
#[derive(Debug, Clone)]
pub(crate) enum BackendCommand {
    Play(TrackRef),
    Pause(bool),
    Stop,
    SetVolume(u16),
    Disconnect,
}

/// Backend commands the session needs to hear about when they fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BackendFailure {
    Play(TrackId),
    Stop,
}

/// Spawn the worker for one connection
///
/// The worker only holds a weak sender to the session mailbox, so it never
/// keeps a finished session alive.
///
/// While `live` is false every command except `Disconnect` is dropped, so
/// work queued before a shutdown never reaches the backend. The worker exits
/// after `Disconnect` or when the sender side closes.
pub(crate) fn spawn_backend_worker(
    backend: Arc<dyn AudioBackend>,
    handle: BackendHandle,
    live: Arc<AtomicBool>,
    mut commands: mpsc::UnboundedReceiver<BackendCommand>,
    session: mpsc::WeakUnboundedSender<SessionMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(command) = commands.recv().await {
            if !live.load(Ordering::Acquire) && !matches!(command, BackendCommand::Disconnect) {
                debug!(?command, "Dropping backend command for closed session");
                continue;
            }

            let (result, failure) = match &command {
                BackendCommand::Play(track) => (
                    backend.play(&handle, track).await,
                    Some(BackendFailure::Play(track.id.clone())),
                ),
                BackendCommand::Pause(paused) => (backend.pause(&handle, *paused).await, None),
                BackendCommand::Stop => (backend.stop(&handle).await, Some(BackendFailure::Stop)),
                BackendCommand::SetVolume(volume) => {
                    (backend.set_volume(&handle, *volume).await, None)
                }
                BackendCommand::Disconnect => (backend.disconnect(&handle).await, None),
            };

            if let Err(e) = result {
                warn!(?command, "Backend command failed: {}", e);
                // Session may already be gone
                if let (Some(failure), Some(session)) = (failure, session.upgrade()) {
                    let _ = session.send(SessionMessage::BackendFailed { failure, error: e });
                }
            }

            if matches!(command, BackendCommand::Disconnect) {
                break;
            }
        }
        debug!(guild = %handle.guild, "Backend worker stopped");
    })
}
