//! Simulated audio backend
//!
//! Nothing is decoded. Each loaded track is a timer that fires
//! `TrackEnded(Finished)` once its (scaled) duration has elapsed, which is
//! enough to drive the session through real transitions from a terminal.

use async_trait::async_trait;
use encore_core::{
    AudioBackend, BackendEvent, BackendHandle, EncoreError, EndReason, GuildId, Result, TrackId,
    TrackRef,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

struct LoadedTrack {
    handle: BackendHandle,
    track_id: TrackId,
    remaining: Duration,
    started: Option<Instant>,
    timer: Option<JoinHandle<()>>,
}

impl LoadedTrack {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct Connection {
    handle: BackendHandle,
    loaded: Option<LoadedTrack>,
    volume: u16,
}

impl Connection {
    fn close(&mut self) {
        if let Some(track) = self.loaded.as_mut() {
            track.cancel_timer();
        }
    }
}

type Connections = HashMap<GuildId, Connection>;

/// In-memory backend driven by tokio timers
///
/// One connection per guild. Commands carrying a handle from an earlier
/// connection for the guild fail (or, for `disconnect`, do nothing).
pub struct SimulatedBackend {
    connections: Arc<Mutex<Connections>>,
    events: mpsc::UnboundedSender<BackendEvent>,
    speed: f64,
}

impl SimulatedBackend {
    /// Create a backend and the event stream it reports on
    ///
    /// `speed` scales every track's duration.
    pub fn new(speed: f64) -> (Self, mpsc::UnboundedReceiver<BackendEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let backend = Self {
            connections: Arc::new(Mutex::new(HashMap::new())),
            events,
            speed,
        };
        (backend, rx)
    }

    /// Output volume last set for a guild
    pub fn volume(&self, guild: GuildId) -> Option<u16> {
        self.lock().get(&guild).map(|c| c.volume)
    }

    /// Handle of the guild's open connection
    pub fn connection(&self, guild: GuildId) -> Option<BackendHandle> {
        self.lock().get(&guild).map(|c| c.handle)
    }

    fn lock(&self) -> MutexGuard<'_, Connections> {
        // A panic while holding the lock leaves plain data behind
        self.connections
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Connection `handle` refers to, unless it was replaced or closed
    fn live<'a>(
        connections: &'a mut Connections,
        handle: &BackendHandle,
    ) -> Result<&'a mut Connection> {
        connections
            .get_mut(&handle.guild)
            .filter(|c| c.handle == *handle)
            .ok_or_else(|| {
                EncoreError::backend(format!(
                    "no voice connection for guild {} (epoch {})",
                    handle.guild, handle.epoch
                ))
            })
    }

    fn emit(&self, handle: BackendHandle, track_id: TrackId, reason: EndReason) {
        let _ = self.events.send(BackendEvent::TrackEnded {
            handle,
            track_id,
            reason,
        });
    }

    fn start_timer(&self, guild: GuildId, track_id: TrackId, after: Duration) -> JoinHandle<()> {
        let connections = self.connections.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            tokio::time::sleep(after).await;

            let finished = {
                let mut connections = connections
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                match connections.get_mut(&guild) {
                    Some(connection)
                        if connection
                            .loaded
                            .as_ref()
                            .is_some_and(|t| t.track_id == track_id) =>
                    {
                        connection.loaded.take().map(|t| t.handle)
                    }
                    _ => None,
                }
            };

            if let Some(handle) = finished {
                debug!(%guild, %track_id, "Track finished");
                let _ = events.send(BackendEvent::TrackEnded {
                    handle,
                    track_id,
                    reason: EndReason::Finished,
                });
            }
        })
    }

    fn scaled(&self, track: &TrackRef) -> Duration {
        Duration::from_millis(track.duration_ms).mul_f64(self.speed)
    }
}

#[async_trait]
impl AudioBackend for SimulatedBackend {
    async fn connect(&self, handle: &BackendHandle) -> Result<()> {
        if handle.channel.get() == 0 {
            return Err(EncoreError::connection("channel 0 does not exist"));
        }
        let replaced = self.lock().insert(
            handle.guild,
            Connection {
                handle: *handle,
                loaded: None,
                volume: 1000,
            },
        );
        if let Some(mut old) = replaced {
            debug!(guild = %handle.guild, old_epoch = old.handle.epoch, "Replacing connection");
            old.close();
        }
        info!(
            guild = %handle.guild,
            channel = %handle.channel,
            epoch = handle.epoch,
            "Voice connected"
        );
        Ok(())
    }

    async fn play(&self, handle: &BackendHandle, track: &TrackRef) -> Result<()> {
        let replaced = {
            let mut connections = self.lock();
            let connection = Self::live(&mut connections, handle)?;

            let duration = self.scaled(track);
            let timer = self.start_timer(handle.guild, track.id.clone(), duration);
            let previous = connection.loaded.replace(LoadedTrack {
                handle: *handle,
                track_id: track.id.clone(),
                remaining: duration,
                started: Some(Instant::now()),
                timer: Some(timer),
            });

            previous.map(|mut old| {
                old.cancel_timer();
                (old.handle, old.track_id)
            })
        };

        if let Some((old_handle, old_track)) = replaced {
            self.emit(old_handle, old_track, EndReason::Replaced);
        }
        debug!(guild = %handle.guild, track = %track.title, "Playing");
        Ok(())
    }

    async fn pause(&self, handle: &BackendHandle, paused: bool) -> Result<()> {
        let mut connections = self.lock();
        let Some(loaded) = Self::live(&mut connections, handle)?.loaded.as_mut() else {
            return Ok(());
        };

        if paused {
            if let Some(started) = loaded.started.take() {
                loaded.cancel_timer();
                loaded.remaining = loaded.remaining.saturating_sub(started.elapsed());
            }
        } else if loaded.started.is_none() {
            loaded.started = Some(Instant::now());
            let timer = self.start_timer(handle.guild, loaded.track_id.clone(), loaded.remaining);
            loaded.timer = Some(timer);
        }
        Ok(())
    }

    async fn stop(&self, handle: &BackendHandle) -> Result<()> {
        let stopped = Self::live(&mut self.lock(), handle)?.loaded.take();

        // Nothing loaded means the track already ended and reported so
        if let Some(mut track) = stopped {
            track.cancel_timer();
            self.emit(track.handle, track.track_id, EndReason::Stopped);
        }
        Ok(())
    }

    async fn set_volume(&self, handle: &BackendHandle, volume: u16) -> Result<()> {
        Self::live(&mut self.lock(), handle)?.volume = volume;
        Ok(())
    }

    async fn disconnect(&self, handle: &BackendHandle) -> Result<()> {
        let mut connections = self.lock();
        if connections.get(&handle.guild).map(|c| c.handle) != Some(*handle) {
            debug!(guild = %handle.guild, epoch = handle.epoch, "Connection already gone");
            return Ok(());
        }

        if let Some(mut connection) = connections.remove(&handle.guild) {
            connection.close();
        }
        info!(guild = %handle.guild, epoch = handle.epoch, "Voice disconnected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_core::ChannelId;

    fn handle(epoch: u64) -> BackendHandle {
        BackendHandle::new(GuildId::new(1), ChannelId::new(10)).with_epoch(epoch)
    }

    async fn connected(speed: f64) -> (SimulatedBackend, mpsc::UnboundedReceiver<BackendEvent>) {
        let (backend, events) = SimulatedBackend::new(speed);
        backend.connect(&handle(1)).await.unwrap();
        (backend, events)
    }

    #[tokio::test(start_paused = true)]
    async fn test_track_finishes_after_scaled_duration() {
        let (backend, mut events) = connected(0.5).await;
        let track = TrackRef::new("Song", 10_000);

        backend.play(&handle(1), &track).await.unwrap();
        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert!(events.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(
            events.recv().await.unwrap(),
            BackendEvent::TrackEnded {
                handle: handle(1),
                track_id: track.id,
                reason: EndReason::Finished,
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_and_replace_report_reasons() {
        let (backend, mut events) = connected(1.0).await;
        let first = TrackRef::new("First", 60_000);
        let second = TrackRef::new("Second", 60_000);

        backend.play(&handle(1), &first).await.unwrap();
        backend.play(&handle(1), &second).await.unwrap();
        backend.stop(&handle(1)).await.unwrap();

        let reasons: Vec<_> = [events.recv().await.unwrap(), events.recv().await.unwrap()]
            .into_iter()
            .map(|BackendEvent::TrackEnded { track_id, reason, .. }| (track_id, reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (first.id, EndReason::Replaced),
                (second.id, EndReason::Stopped)
            ]
        );

        // Timers were cancelled
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_holds_the_timer() {
        let (backend, mut events) = connected(1.0).await;
        let track = TrackRef::new("Song", 10_000);

        backend.play(&handle(1), &track).await.unwrap();
        tokio::time::sleep(Duration::from_secs(4)).await;
        backend.pause(&handle(1), true).await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(events.try_recv().is_err());

        backend.pause(&handle(1), false).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5_900)).await;
        assert!(events.try_recv().is_err());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(events.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_connect_rejects_channel_zero() {
        let (backend, _events) = SimulatedBackend::new(1.0);
        let zero = BackendHandle::new(GuildId::new(1), ChannelId::new(0));
        let result = backend.connect(&zero).await;
        assert!(matches!(result, Err(EncoreError::Connection(_))));
        assert_eq!(backend.connection(GuildId::new(1)), None);
    }

    #[tokio::test]
    async fn test_commands_need_a_connection() {
        let (backend, _events) = SimulatedBackend::new(1.0);
        let track = TrackRef::new("Song", 1_000);
        assert!(backend.play(&handle(1), &track).await.is_err());
        assert!(backend.stop(&handle(1)).await.is_err());

        backend.connect(&handle(1)).await.unwrap();
        backend.set_volume(&handle(1), 400).await.unwrap();
        assert_eq!(backend.volume(GuildId::new(1)), Some(400));

        backend.disconnect(&handle(1)).await.unwrap();
        assert_eq!(backend.volume(GuildId::new(1)), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_old_handle_cannot_touch_reconnected_guild() {
        let (backend, mut events) = connected(1.0).await;
        let track = TrackRef::new("Song", 10_000);

        // Reconnect before the first connection's disconnect lands
        backend.connect(&handle(2)).await.unwrap();
        backend.play(&handle(2), &track).await.unwrap();
        backend.disconnect(&handle(1)).await.unwrap();

        assert_eq!(backend.connection(GuildId::new(1)), Some(handle(2)));
        assert!(backend.play(&handle(1), &track).await.is_err());
        assert!(backend.set_volume(&handle(1), 10).await.is_err());
        assert!(backend.stop(&handle(1)).await.is_err());

        // The new connection still plays to the end
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(
            events.recv().await.unwrap(),
            BackendEvent::TrackEnded {
                handle: handle(2),
                track_id: track.id,
                reason: EndReason::Finished,
            }
        );
    }
}
