#![allow(dead_code)]

/// Common test utilities and fakes
use async_trait::async_trait;
use encore_core::{
    AudioBackend, BackendEvent, BackendHandle, ChannelId, DisplayHandle, EncoreError, EndReason,
    GuildId, Presenter, QueueView, Result, TrackDisplayData, TrackId, TrackRef, TrackResolver,
};
use encore_playback::PlaybackConfig;
use encore_session::{CommandContext, SessionHandle, SessionRegistry, SessionSnapshot};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

pub const TEXT_CHANNEL: ChannelId = ChannelId::new(500);
pub const VOICE_CHANNEL: ChannelId = ChannelId::new(700);

/// Backend calls in the order they were made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Connect(GuildId, ChannelId),
    Play(GuildId, String),
    Pause(GuildId, bool),
    Stop(GuildId),
    SetVolume(GuildId, u16),
    Disconnect(GuildId),
}

/// Audio backend that records calls and emits events on request
pub struct RecordingBackend {
    calls: Mutex<Vec<BackendCall>>,
    connections: Mutex<Vec<BackendHandle>>,
    playing: Mutex<HashMap<GuildId, (BackendHandle, TrackId)>>,
    events: mpsc::UnboundedSender<BackendEvent>,
    fail_connect: AtomicBool,
    failing_titles: Mutex<HashSet<String>>,
    emit_on_stop: AtomicBool,
}

impl RecordingBackend {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<BackendEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let backend = Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            connections: Mutex::new(Vec::new()),
            playing: Mutex::new(HashMap::new()),
            events,
            fail_connect: AtomicBool::new(false),
            failing_titles: Mutex::new(HashSet::new()),
            emit_on_stop: AtomicBool::new(true),
        });
        (backend, rx)
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn played_titles(&self, guild: GuildId) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Play(g, title) if g == guild => Some(title),
                _ => None,
            })
            .collect()
    }

    /// Every handle `connect` was called with, oldest first
    pub fn connected_handles(&self) -> Vec<BackendHandle> {
        self.connections.lock().unwrap().clone()
    }

    pub fn has_call(&self, call: &BackendCall) -> bool {
        self.calls.lock().unwrap().contains(call)
    }

    pub fn fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub fn fail_play(&self, title: &str) {
        self.failing_titles.lock().unwrap().insert(title.to_string());
    }

    /// When false, `stop` does not answer with a `TrackEnded`
    pub fn emit_on_stop(&self, emit: bool) {
        self.emit_on_stop.store(emit, Ordering::SeqCst);
    }

    /// Handle and track currently loaded for a guild
    pub fn now_playing(&self, guild: GuildId) -> Option<(BackendHandle, TrackId)> {
        self.playing.lock().unwrap().get(&guild).cloned()
    }

    /// Pretend the loaded track ran to its end
    pub fn finish(&self, guild: GuildId) {
        self.end(guild, EndReason::Finished);
    }

    pub fn end(&self, guild: GuildId, reason: EndReason) {
        let (handle, track_id) = self
            .playing
            .lock()
            .unwrap()
            .remove(&guild)
            .expect("nothing loaded for guild");
        self.emit(handle, track_id, reason);
    }

    pub fn emit(&self, handle: BackendHandle, track_id: TrackId, reason: EndReason) {
        let _ = self.events.send(BackendEvent::TrackEnded {
            handle,
            track_id,
            reason,
        });
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AudioBackend for RecordingBackend {
    async fn connect(&self, handle: &BackendHandle) -> Result<()> {
        self.record(BackendCall::Connect(handle.guild, handle.channel));
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(EncoreError::connection("voice gateway unreachable"));
        }
        self.connections.lock().unwrap().push(*handle);
        Ok(())
    }

    async fn play(&self, handle: &BackendHandle, track: &TrackRef) -> Result<()> {
        self.record(BackendCall::Play(handle.guild, track.title.clone()));
        if self.failing_titles.lock().unwrap().contains(&track.title) {
            return Err(EncoreError::backend("track could not be loaded"));
        }
        self.playing
            .lock()
            .unwrap()
            .insert(handle.guild, (*handle, track.id.clone()));
        Ok(())
    }

    async fn pause(&self, handle: &BackendHandle, paused: bool) -> Result<()> {
        self.record(BackendCall::Pause(handle.guild, paused));
        Ok(())
    }

    async fn stop(&self, handle: &BackendHandle) -> Result<()> {
        self.record(BackendCall::Stop(handle.guild));
        if self.emit_on_stop.load(Ordering::SeqCst) {
            let loaded = self.playing.lock().unwrap().remove(&handle.guild);
            if let Some((handle, track_id)) = loaded {
                self.emit(handle, track_id, EndReason::Stopped);
            }
        }
        Ok(())
    }

    async fn set_volume(&self, handle: &BackendHandle, volume: u16) -> Result<()> {
        self.record(BackendCall::SetVolume(handle.guild, volume));
        Ok(())
    }

    async fn disconnect(&self, handle: &BackendHandle) -> Result<()> {
        self.record(BackendCall::Disconnect(handle.guild));
        let mut playing = self.playing.lock().unwrap();
        if playing.get(&handle.guild).is_some_and(|(loaded, _)| loaded == handle) {
            playing.remove(&handle.guild);
        }
        Ok(())
    }
}

/// Presenter output in the order it was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCall {
    NowPlaying { title: String, requested_by: String },
    UpdateNowPlaying { title: String, requested_by: String },
    Queue(QueueView),
    Message(String),
    Disconnected,
}

#[derive(Default)]
pub struct RecordingPresenter {
    calls: Mutex<Vec<PresenterCall>>,
    next_message_id: AtomicU64,
    display_gone: AtomicBool,
}

impl RecordingPresenter {
    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PresenterCall::Message(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn has_message(&self, text: &str) -> bool {
        self.messages().iter().any(|m| m == text)
    }

    /// Simulate the now-playing message being deleted
    pub fn delete_display(&self) {
        self.display_gone.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: PresenterCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    async fn show_now_playing(
        &self,
        channel: ChannelId,
        data: &TrackDisplayData,
    ) -> Result<DisplayHandle> {
        self.record(PresenterCall::NowPlaying {
            title: data.title.clone(),
            requested_by: data.requested_by.clone(),
        });
        let id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        Ok(DisplayHandle::new(channel, id.to_string()))
    }

    async fn update_now_playing(
        &self,
        _handle: &DisplayHandle,
        data: &TrackDisplayData,
    ) -> Result<()> {
        if self.display_gone.load(Ordering::SeqCst) {
            return Err(EncoreError::DisplayGone);
        }
        self.record(PresenterCall::UpdateNowPlaying {
            title: data.title.clone(),
            requested_by: data.requested_by.clone(),
        });
        Ok(())
    }

    async fn show_queue(&self, _channel: ChannelId, view: &QueueView) -> Result<()> {
        self.record(PresenterCall::Queue(view.clone()));
        Ok(())
    }

    async fn show_message(&self, _channel: ChannelId, text: &str) -> Result<()> {
        self.record(PresenterCall::Message(text.to_string()));
        Ok(())
    }

    async fn show_disconnected(&self, _handle: &DisplayHandle) -> Result<()> {
        self.record(PresenterCall::Disconnected);
        Ok(())
    }
}

/// Resolver over a fixed catalog, matching on title
pub struct StaticResolver(pub Vec<TrackRef>);

#[async_trait]
impl TrackResolver for StaticResolver {
    async fn search(&self, query: &str) -> Result<Vec<TrackRef>> {
        let query = query.to_lowercase();
        Ok(self
            .0
            .iter()
            .filter(|t| t.title.to_lowercase().contains(&query))
            .cloned()
            .collect())
    }
}

/// Catalog used by most tests: tracks "A" through "E"
pub fn catalog() -> Vec<TrackRef> {
    ["A", "B", "C", "D", "E"]
        .iter()
        .map(|title| TrackRef::new(format!("Track {}", title), 180_000).with_author("Tester"))
        .collect()
}

/// Registry wired to recording fakes, with the event pump running
pub struct Harness {
    pub registry: Arc<SessionRegistry>,
    pub backend: Arc<RecordingBackend>,
    pub presenter: Arc<RecordingPresenter>,
}

pub fn harness() -> Harness {
    harness_with(PlaybackConfig::default())
}

pub fn harness_with(config: PlaybackConfig) -> Harness {
    let (backend, events) = RecordingBackend::new();
    let presenter = Arc::new(RecordingPresenter::default());
    let resolver = Arc::new(StaticResolver(catalog()));

    let registry = Arc::new(SessionRegistry::new(
        backend.clone(),
        resolver,
        presenter.clone(),
        config,
    ));
    registry.clone().spawn_event_pump(events);

    Harness {
        registry,
        backend,
        presenter,
    }
}

/// Command context for a user sitting in the voice channel
pub fn ctx(guild: u64) -> CommandContext {
    CommandContext {
        guild: GuildId::new(guild),
        text_channel: TEXT_CHANNEL,
        voice_channel: Some(VOICE_CHANNEL),
        requested_by: "@alice".to_string(),
    }
}

/// Poll `condition` until it holds, panicking after two seconds
pub async fn wait_until<F>(what: &str, mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {}",
            what
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Poll a session's snapshot until `condition` holds
pub async fn wait_for_snapshot<F>(session: &SessionHandle, what: &str, mut condition: F)
where
    F: FnMut(&SessionSnapshot) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let snapshot = session.snapshot().await.expect("session closed");
        if condition(&snapshot) {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {}",
            what
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
