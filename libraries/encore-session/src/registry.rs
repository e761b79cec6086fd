//! Session registry
//!
//! Owns the guild -> session map and the shared collaborators. Entry point
//! for user commands and for the backend event stream.

use crate::command::{CommandContext, UserCommand};
use crate::error::{Result, SessionError};
use crate::session::{PlaybackSession, SessionHandle, ShutdownReason};
use encore_core::{
    AudioBackend, BackendEvent, BackendHandle, ChannelId, GuildId, Presenter, TrackResolver,
};
use encore_playback::PlaybackConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result of a join request
#[derive(Debug, Clone)]
pub enum JoinOutcome {
    /// A new session was started
    Joined(SessionHandle),
    /// The guild already had a live session
    AlreadyConnected(SessionHandle),
}

impl JoinOutcome {
    pub fn session(&self) -> &SessionHandle {
        match self {
            Self::Joined(session) | Self::AlreadyConnected(session) => session,
        }
    }
}

/// All live sessions, at most one per guild
pub struct SessionRegistry {
    sessions: RwLock<HashMap<GuildId, SessionHandle>>,
    backend: Arc<dyn AudioBackend>,
    resolver: Arc<dyn TrackResolver>,
    presenter: Arc<dyn Presenter>,
    config: PlaybackConfig,
    next_epoch: AtomicU64,
    join_locks: Mutex<HashMap<GuildId, Arc<Mutex<()>>>>,
}

impl SessionRegistry {
    pub fn new(
        backend: Arc<dyn AudioBackend>,
        resolver: Arc<dyn TrackResolver>,
        presenter: Arc<dyn Presenter>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            backend,
            resolver,
            presenter,
            config,
            next_epoch: AtomicU64::new(1),
            join_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Live session for a guild, if any
    ///
    /// Sessions that ended on their own are pruned here.
    pub async fn get(&self, guild: GuildId) -> Option<SessionHandle> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(&guild) {
                Some(session) if !session.is_closed() => return Some(session.clone()),
                None => return None,
                Some(_) => {}
            }
        }

        let mut sessions = self.sessions.write().await;
        if sessions.get(&guild).is_some_and(SessionHandle::is_closed) {
            debug!(%guild, "Pruning ended session");
            sessions.remove(&guild);
        }
        sessions.get(&guild).cloned()
    }

    /// Number of live sessions
    pub async fn active_sessions(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| !s.is_closed())
            .count()
    }

    /// Connect to a voice channel and start a session
    ///
    /// Returns the existing session if the guild is already connected.
    /// Joins for the same guild run one at a time; other guilds are not held
    /// up by a slow connect.
    pub async fn join(
        &self,
        guild: GuildId,
        voice_channel: ChannelId,
        text_channel: ChannelId,
    ) -> Result<JoinOutcome> {
        let join_lock = self.join_locks.lock().await.entry(guild).or_default().clone();
        let _joining = join_lock.lock().await;

        if let Some(existing) = self.get(guild).await {
            return Ok(JoinOutcome::AlreadyConnected(existing));
        }

        let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed);
        let handle = BackendHandle::new(guild, voice_channel).with_epoch(epoch);
        self.backend.connect(&handle).await?;

        let session = PlaybackSession::spawn(
            handle,
            text_channel,
            self.config.clone(),
            self.backend.clone(),
            self.presenter.clone(),
        );
        self.sessions.write().await.insert(guild, session.clone());
        info!(%guild, channel = %voice_channel, epoch, "Joined voice channel");

        Ok(JoinOutcome::Joined(session))
    }

    /// Route one backend event to its session
    ///
    /// Events from a previous connection for the same guild are dropped.
    pub async fn handle_backend_event(&self, event: BackendEvent) {
        let handle = event.handle();
        let Some(session) = self.get(handle.guild).await else {
            debug!(guild = %handle.guild, "Event for guild without a session");
            return;
        };
        if session.backend_handle() != handle {
            debug!(
                guild = %handle.guild,
                event_epoch = handle.epoch,
                session_epoch = session.backend_handle().epoch,
                "Dropping event from an old connection"
            );
            return;
        }

        match event {
            BackendEvent::TrackEnded {
                track_id, reason, ..
            } => {
                if !session.track_ended(track_id, reason) {
                    debug!(guild = %handle.guild, "Session ended before event arrived");
                }
            }
        }
    }

    /// Forward every event from `events` until the stream closes
    pub fn spawn_event_pump(
        self: Arc<Self>,
        mut events: mpsc::UnboundedReceiver<BackendEvent>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                self.handle_backend_event(event).await;
            }
            debug!("Backend event stream closed");
        })
    }

    /// Run a user command, reporting failures to the text channel
    pub async fn dispatch(&self, ctx: &CommandContext, command: UserCommand) -> Result<()> {
        let result = self.execute(ctx, command).await;
        if let Err(e) = &result {
            // Session-level failures were already reported by the session
            if e.reported_by_session() {
                debug!(guild = %ctx.guild, "Command failed: {}", e);
            } else {
                self.message(ctx.text_channel, &e.user_message()).await;
            }
        }
        result
    }

    async fn execute(&self, ctx: &CommandContext, command: UserCommand) -> Result<()> {
        match command {
            UserCommand::Join => {
                let voice = ctx.voice_channel.ok_or(SessionError::NotInVoiceChannel)?;
                match self.join(ctx.guild, voice, ctx.text_channel).await? {
                    JoinOutcome::Joined(_) => {
                        self.message(ctx.text_channel, &format!("Joined {}", voice.mention()))
                            .await;
                    }
                    JoinOutcome::AlreadyConnected(session) => {
                        let channel = session.backend_handle().channel;
                        self.message(
                            ctx.text_channel,
                            &format!("Already connected to {}", channel.mention()),
                        )
                        .await;
                    }
                }
                Ok(())
            }
            UserCommand::Play(query) => {
                let session = match self.get(ctx.guild).await {
                    Some(session) => session,
                    None => {
                        let voice = ctx.voice_channel.ok_or(SessionError::NotInVoiceChannel)?;
                        self.join(ctx.guild, voice, ctx.text_channel)
                            .await?
                            .session()
                            .clone()
                    }
                };

                let mut tracks = self.resolver.search(&query).await?;
                if tracks.is_empty() {
                    return Err(SessionError::NoTracksFound(query));
                }
                let track = tracks.swap_remove(0);
                session.play(track, ctx.requested_by.clone()).await
            }
            UserCommand::Stop => {
                let session = self.sessions.write().await.remove(&ctx.guild);
                match session.filter(|s| !s.is_closed()) {
                    Some(session) => session.stop().await,
                    None => Err(SessionError::NotConnected),
                }
            }
            command => {
                let session = self.get(ctx.guild).await.ok_or(SessionError::NotConnected)?;
                match command {
                    UserCommand::Previous => session.previous().await,
                    UserCommand::Pause => session.pause().await,
                    UserCommand::Resume => session.resume().await,
                    UserCommand::Skip => session.skip().await,
                    UserCommand::ShowQueue => session.show_queue().await,
                    UserCommand::Shuffle => session.shuffle().await,
                    UserCommand::CycleLoop => session.cycle_loop_mode().await,
                    UserCommand::VolumeUp => session.volume_up().await,
                    UserCommand::VolumeDown => session.volume_down().await,
                    UserCommand::Join | UserCommand::Play(_) | UserCommand::Stop => Ok(()),
                }
            }
        }
    }

    /// Stop every session (process exit)
    pub async fn shutdown_all(&self) {
        let sessions: Vec<_> = self.sessions.write().await.drain().collect();
        info!(count = sessions.len(), "Closing all sessions");
        for (guild, session) in sessions {
            if let Err(e) = session.close(ShutdownReason::Closing).await {
                warn!(%guild, "Failed to close session: {}", e);
            }
        }
    }

    async fn message(&self, channel: ChannelId, text: &str) {
        if let Err(e) = self.presenter.show_message(channel, text).await {
            warn!("Could not send message: {}", e);
        }
    }
}
