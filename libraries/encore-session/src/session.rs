//! Playback session actor
//!
//! One task per voice connection owns the session's [`PlaybackState`].
//! User commands, backend events and shutdown requests all arrive through a
//! single mailbox, so state is only ever touched by that task.
//!
//! A skip sends `stop` to the backend and raises a transition barrier: until
//! the matching `TrackEnded` arrives, further user commands are deferred in
//! arrival order and replayed once the transition has been applied.

use crate::error::{Result, SessionError};
use crate::worker::{spawn_backend_worker, BackendCommand, BackendFailure};
use encore_core::{
    AudioBackend, BackendHandle, ChannelId, DisplayHandle, EncoreError, EndReason, Presenter,
    TrackDisplayData, TrackId, TrackRef,
};
use encore_playback::{
    LoopMode, PlayOutcome, PlaybackConfig, PlaybackSnapshot, PlaybackState, Transition, Trigger,
};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// "Requested by" label for tracks the queue started on its own
pub const QUEUE_REQUESTER: &str = "Queue";

/// Operations on a live session
#[derive(Debug, Clone)]
pub(crate) enum SessionCommand {
    Play {
        track: TrackRef,
        requested_by: String,
    },
    Skip,
    Previous,
    Pause,
    Resume,
    ShowQueue,
    Shuffle,
    CycleLoop,
    SetLoop(LoopMode),
    VolumeUp,
    VolumeDown,
    AdjustVolume(i32),
}

/// Why a session is being torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShutdownReason {
    /// User pressed stop
    UserStop,
    /// Nothing left to play
    QueueFinished,
    /// Registry is closing down
    Closing,
}

pub(crate) enum SessionMessage {
    Command {
        command: SessionCommand,
        reply: oneshot::Sender<Result<()>>,
    },
    TrackEnded {
        track_id: TrackId,
        reason: EndReason,
    },
    BackendFailed {
        failure: BackendFailure,
        error: EncoreError,
    },
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Shutdown {
        reason: ShutdownReason,
        reply: oneshot::Sender<()>,
    },
}

/// Point-in-time view of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub handle: BackendHandle,
    pub text_channel: ChannelId,
    pub playback: PlaybackSnapshot,
    pub display: Option<DisplayHandle>,

    /// A skip is waiting for its `TrackEnded`
    pub transition_pending: bool,

    /// Commands held back by the pending transition
    pub deferred_commands: usize,
}

/// Cloneable handle to a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: Uuid,
    backend: BackendHandle,
    text_channel: ChannelId,
    tx: mpsc::UnboundedSender<SessionMessage>,
}

impl SessionHandle {
    /// Session identifier (for logs)
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Voice connection this session drives
    pub fn backend_handle(&self) -> BackendHandle {
        self.backend
    }

    /// Channel replies are posted to
    pub fn text_channel(&self) -> ChannelId {
        self.text_channel
    }

    /// Whether the session task has exited
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn request(&self, command: SessionCommand) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(SessionMessage::Command { command, reply })
            .map_err(|_| SessionError::SessionClosed)?;
        response.await.map_err(|_| SessionError::SessionClosed)?
    }

    /// Play now if idle, otherwise add to the queue
    pub async fn play(&self, track: TrackRef, requested_by: impl Into<String>) -> Result<()> {
        self.request(SessionCommand::Play {
            track,
            requested_by: requested_by.into(),
        })
        .await
    }

    /// Stop the current track; the backend's `TrackEnded` moves playback on
    pub async fn skip(&self) -> Result<()> {
        self.request(SessionCommand::Skip).await
    }

    /// Go back to the last played track
    pub async fn previous(&self) -> Result<()> {
        self.request(SessionCommand::Previous).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.request(SessionCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.request(SessionCommand::Resume).await
    }

    /// Show current track and queue
    pub async fn show_queue(&self) -> Result<()> {
        self.request(SessionCommand::ShowQueue).await
    }

    pub async fn shuffle(&self) -> Result<()> {
        self.request(SessionCommand::Shuffle).await
    }

    /// Off -> Song -> Queue -> Off
    pub async fn cycle_loop_mode(&self) -> Result<()> {
        self.request(SessionCommand::CycleLoop).await
    }

    pub async fn set_loop_mode(&self, mode: LoopMode) -> Result<()> {
        self.request(SessionCommand::SetLoop(mode)).await
    }

    pub async fn volume_up(&self) -> Result<()> {
        self.request(SessionCommand::VolumeUp).await
    }

    pub async fn volume_down(&self) -> Result<()> {
        self.request(SessionCommand::VolumeDown).await
    }

    /// Shift volume by `delta`, clamped to the configured range
    pub async fn adjust_volume(&self, delta: i32) -> Result<()> {
        self.request(SessionCommand::AdjustVolume(delta)).await
    }

    /// Clear everything and disconnect
    ///
    /// Idempotent: stopping a session that already ended succeeds.
    pub async fn stop(&self) -> Result<()> {
        self.close(ShutdownReason::UserStop).await
    }

    pub(crate) async fn close(&self, reason: ShutdownReason) -> Result<()> {
        let (reply, done) = oneshot::channel();
        if self
            .tx
            .send(SessionMessage::Shutdown { reason, reply })
            .is_ok()
        {
            let _ = done.await;
        }
        Ok(())
    }

    /// Deliver a backend `TrackEnded`; returns false if the session is gone
    pub fn track_ended(&self, track_id: TrackId, reason: EndReason) -> bool {
        self.tx
            .send(SessionMessage::TrackEnded { track_id, reason })
            .is_ok()
    }

    /// Read the session state without changing it
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(SessionMessage::Snapshot(reply))
            .map_err(|_| SessionError::SessionClosed)?;
        response.await.map_err(|_| SessionError::SessionClosed)
    }
}

/// The session actor
pub struct PlaybackSession {
    id: Uuid,
    handle: BackendHandle,
    text_channel: ChannelId,
    state: PlaybackState,
    display: Option<DisplayHandle>,
    presenter: Arc<dyn Presenter>,
    inbox: mpsc::UnboundedReceiver<SessionMessage>,
    backend_tx: mpsc::UnboundedSender<BackendCommand>,
    backend_worker: JoinHandle<()>,

    /// Cleared on shutdown; the backend worker drops queued work once false
    live: Arc<AtomicBool>,
    active: bool,

    /// Track a skip is waiting on
    awaiting_end: Option<TrackId>,
    deferred: VecDeque<(SessionCommand, oneshot::Sender<Result<()>>)>,
}

impl PlaybackSession {
    /// Start a session task for an open voice connection
    pub fn spawn(
        handle: BackendHandle,
        text_channel: ChannelId,
        config: PlaybackConfig,
        backend: Arc<dyn AudioBackend>,
        presenter: Arc<dyn Presenter>,
    ) -> SessionHandle {
        let id = Uuid::new_v4();
        let (tx, inbox) = mpsc::unbounded_channel();
        let (backend_tx, backend_rx) = mpsc::unbounded_channel();
        let live = Arc::new(AtomicBool::new(true));

        let backend_worker =
            spawn_backend_worker(backend, handle, live.clone(), backend_rx, tx.downgrade());

        let session = PlaybackSession {
            id,
            handle,
            text_channel,
            state: PlaybackState::new(config),
            display: None,
            presenter,
            inbox,
            backend_tx,
            backend_worker,
            live,
            active: true,
            awaiting_end: None,
            deferred: VecDeque::new(),
        };

        let span = info_span!("session", guild = %handle.guild, session_id = %id);
        tokio::spawn(session.run().instrument(span));

        SessionHandle {
            id,
            backend: handle,
            text_channel,
            tx,
        }
    }

    async fn run(mut self) {
        info!(channel = %self.handle.channel, "Session started");

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message).await;
            if !self.active {
                break;
            }
        }

        // Every handle dropped without an explicit shutdown
        if self.active {
            self.shutdown(ShutdownReason::Closing).await;
        }

        drop(self.backend_tx);
        if let Err(e) = self.backend_worker.await {
            warn!("Backend worker ended abnormally: {}", e);
        }
        info!("Session ended");
    }

    async fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Command { command, reply } => {
                if self.awaiting_end.is_some() {
                    debug!(?command, "Deferring command until the pending skip lands");
                    self.deferred.push_back((command, reply));
                } else {
                    self.run_command(command, reply).await;
                }
            }
            SessionMessage::TrackEnded { track_id, reason } => {
                self.on_track_ended(&track_id, reason).await;
            }
            SessionMessage::BackendFailed { failure, error } => {
                debug!(?failure, "Backend reported failure: {}", error);
                self.on_backend_failed(failure).await;
            }
            SessionMessage::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            SessionMessage::Shutdown { reason, reply } => {
                self.shutdown(reason).await;
                let _ = reply.send(());
            }
        }
    }

    async fn run_command(&mut self, command: SessionCommand, reply: oneshot::Sender<Result<()>>) {
        let result = self.execute(command).await;
        let _ = reply.send(result);
    }

    async fn execute(&mut self, command: SessionCommand) -> Result<()> {
        match command {
            SessionCommand::Play {
                track,
                requested_by,
            } => {
                let title = track.title.clone();
                match self.state.request_play(track) {
                    PlayOutcome::Started(track) => {
                        self.submit(BackendCommand::Play(track.clone()));
                        let data = TrackDisplayData::from_track(&track, requested_by);
                        match self.presenter.show_now_playing(self.text_channel, &data).await {
                            Ok(display) => self.display = Some(display),
                            Err(e) => {
                                warn!("Could not post now playing: {}", e);
                                self.display = None;
                            }
                        }
                    }
                    PlayOutcome::Queued { position } => {
                        debug!(position, "Track queued");
                        self.message(&format!("Added **{}** to the queue.", title))
                            .await;
                    }
                }
                Ok(())
            }
            SessionCommand::Skip => {
                let track_id = match self.state.ensure_playing() {
                    Ok(track) => track.id.clone(),
                    Err(e) => {
                        self.message("No music playing to skip.").await;
                        return Err(e.into());
                    }
                };
                self.awaiting_end = Some(track_id);
                self.submit(BackendCommand::Stop);
                self.message("Skipped song!").await;
                Ok(())
            }
            SessionCommand::Previous => match self.state.previous() {
                Ok(track) => {
                    self.submit(BackendCommand::Play(track.clone()));
                    self.message(&format!("Playing previous song: **{}**", track.title))
                        .await;
                    self.refresh_now_playing(&track).await;
                    Ok(())
                }
                Err(e) => {
                    self.message("No previous song in history.").await;
                    Err(e.into())
                }
            },
            SessionCommand::Pause => match self.state.pause() {
                Ok(()) => {
                    self.submit(BackendCommand::Pause(true));
                    self.message("Paused music!").await;
                    Ok(())
                }
                Err(e) => {
                    self.message("No music playing to pause.").await;
                    Err(e.into())
                }
            },
            SessionCommand::Resume => match self.state.resume() {
                Ok(()) => {
                    self.submit(BackendCommand::Pause(false));
                    self.message("Resumed music!").await;
                    Ok(())
                }
                Err(e) => {
                    self.message("Music is already playing or no music to resume.")
                        .await;
                    Err(e.into())
                }
            },
            SessionCommand::ShowQueue => {
                let view = self.state.queue_view();
                if view.is_empty() {
                    self.message("The queue is empty.").await;
                } else if let Err(e) = self.presenter.show_queue(self.text_channel, &view).await {
                    warn!("Could not show queue: {}", e);
                }
                Ok(())
            }
            SessionCommand::Shuffle => {
                if self.state.queue().is_empty() {
                    self.message("Queue is empty, nothing to shuffle.").await;
                } else {
                    self.state.shuffle();
                    self.message("Queue shuffled!").await;
                }
                Ok(())
            }
            SessionCommand::CycleLoop => {
                let mode = self.state.cycle_loop_mode();
                self.message(&format!("Loop mode set to: **{}**", mode)).await;
                Ok(())
            }
            SessionCommand::SetLoop(mode) => {
                self.state.set_loop_mode(mode);
                self.message(&format!("Loop mode set to: **{}**", mode)).await;
                Ok(())
            }
            SessionCommand::VolumeUp => {
                let volume = self.state.volume_up();
                self.apply_volume(volume).await;
                Ok(())
            }
            SessionCommand::VolumeDown => {
                let volume = self.state.volume_down();
                self.apply_volume(volume).await;
                Ok(())
            }
            SessionCommand::AdjustVolume(delta) => {
                let volume = self.state.adjust_volume(delta);
                self.apply_volume(volume).await;
                Ok(())
            }
        }
    }

    async fn on_track_ended(&mut self, track_id: &TrackId, reason: EndReason) {
        let Some(trigger) = Trigger::from_end_reason(reason) else {
            debug!(%track_id, "Track replaced, nothing to do");
            return;
        };

        if self.state.current().map(|t| &t.id) != Some(track_id) {
            debug!(%track_id, ?reason, "Ignoring end event for a track that is not current");
            return;
        }

        if self.awaiting_end.as_ref() == Some(track_id) {
            self.awaiting_end = None;
        }

        if trigger == Trigger::TrackFailed {
            let title = self
                .state
                .current()
                .map(|t| t.title.clone())
                .unwrap_or_default();
            self.message(&format!("Could not play **{}**, skipping.", title))
                .await;
        }

        self.transition(trigger).await;
        self.resume_deferred().await;
    }

    async fn on_backend_failed(&mut self, failure: BackendFailure) {
        match failure {
            BackendFailure::Play(track_id) => {
                self.on_track_ended(&track_id, EndReason::Error).await;
            }
            BackendFailure::Stop => {
                if self.awaiting_end.take().is_some() {
                    self.message("Could not skip the current song.").await;
                    self.resume_deferred().await;
                }
            }
        }
    }

    async fn transition(&mut self, trigger: Trigger) {
        match self.state.advance(trigger) {
            Transition::Play(track) | Transition::Replay(track) => {
                self.submit(BackendCommand::Play(track.clone()));
                self.refresh_now_playing(&track).await;
            }
            Transition::Disconnect => self.shutdown(ShutdownReason::QueueFinished).await,
        }
    }

    async fn resume_deferred(&mut self) {
        while self.active && self.awaiting_end.is_none() {
            let Some((command, reply)) = self.deferred.pop_front() else {
                break;
            };
            self.run_command(command, reply).await;
        }
    }

    async fn shutdown(&mut self, reason: ShutdownReason) {
        if !self.active {
            return;
        }
        info!(?reason, "Shutting down session");

        self.active = false;
        self.live.store(false, Ordering::Release);
        // Handles see the session as closed from here on
        self.inbox.close();
        self.state.reset();
        self.awaiting_end = None;
        for (_, reply) in self.deferred.drain(..) {
            let _ = reply.send(Err(SessionError::SessionClosed));
        }

        if let Some(display) = self.display.take() {
            if let Err(e) = self.presenter.show_disconnected(&display).await {
                debug!("Could not mark now playing as disconnected: {}", e);
            }
        }
        if reason == ShutdownReason::UserStop {
            self.message("Disconnected from voice and cleared queue.")
                .await;
        }

        self.submit(BackendCommand::Disconnect);
    }

    async fn apply_volume(&mut self, volume: u16) {
        self.submit(BackendCommand::SetVolume(volume));
        self.message(&format!("Volume set to {}%", volume / 10)).await;
    }

    async fn refresh_now_playing(&mut self, track: &TrackRef) {
        let Some(display) = self.display.clone() else {
            return;
        };
        let data = TrackDisplayData::from_track(track, QUEUE_REQUESTER);
        if let Err(e) = self.presenter.update_now_playing(&display, &data).await {
            if e.invalidates_display() {
                debug!("Now playing message is gone, forgetting it");
                self.display = None;
            } else {
                warn!("Could not update now playing: {}", e);
            }
        }
    }

    async fn message(&self, text: &str) {
        if let Err(e) = self.presenter.show_message(self.text_channel, text).await {
            warn!("Could not send message: {}", e);
        }
    }

    fn submit(&self, command: BackendCommand) {
        if self.backend_tx.send(command).is_err() {
            warn!("Backend worker is gone");
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            handle: self.handle,
            text_channel: self.text_channel,
            playback: self.state.snapshot(),
            display: self.display.clone(),
            transition_pending: self.awaiting_end.is_some(),
            deferred_commands: self.deferred.len(),
        }
    }
}
