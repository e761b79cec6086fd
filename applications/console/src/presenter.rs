//! Terminal presenter
//!
//! Renders now-playing cards, queue listings and replies as plain text.
//! Chat markup (`**bold**`) is passed through untouched.

use async_trait::async_trait;
use encore_core::{
    ChannelId, DisplayHandle, EncoreError, Presenter, QueueView, Result, TrackDisplayData,
};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Text shown in place of a now-playing card once the session ends
pub const DISCONNECTED_TEXT: &str = "Queue finished. Disconnected from voice.";

/// Presenter writing to any [`Write`] sink (stdout in the binary)
pub struct TerminalPresenter<W> {
    out: Mutex<W>,
    next_id: AtomicU64,
}

impl TerminalPresenter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            next_id: AtomicU64::new(1),
        }
    }

    /// Give back the sink
    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self, text: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| EncoreError::presenter("output lock poisoned"))?;
        writeln!(out, "{}", text)
            .and_then(|()| out.flush())
            .map_err(|e| EncoreError::presenter(e.to_string()))
    }

    fn render_now_playing(label: &str, handle: &DisplayHandle, data: &TrackDisplayData) -> String {
        format!(
            "[{} #{}] {} by {} ({}), requested by {} at {}",
            label,
            handle.message_id,
            data.title,
            data.author,
            data.formatted_duration(),
            data.requested_by,
            data.requested_at.format("%H:%M:%S"),
        )
    }
}

#[async_trait]
impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    async fn show_now_playing(
        &self,
        channel: ChannelId,
        data: &TrackDisplayData,
    ) -> Result<DisplayHandle> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = DisplayHandle::new(channel, id.to_string());
        self.write(&Self::render_now_playing("Now Playing", &handle, data))?;
        Ok(handle)
    }

    async fn update_now_playing(
        &self,
        handle: &DisplayHandle,
        data: &TrackDisplayData,
    ) -> Result<()> {
        self.write(&Self::render_now_playing("Now Playing", handle, data))
    }

    async fn show_queue(&self, _channel: ChannelId, view: &QueueView) -> Result<()> {
        let mut lines = vec!["Queue:".to_string()];
        lines.extend(
            view.entries
                .iter()
                .map(|entry| format!("{}. {}", entry.position, entry.label())),
        );
        if view.overflow > 0 {
            lines.push(format!("...and {} more", view.overflow));
        }
        self.write(&lines.join("\n"))
    }

    async fn show_message(&self, _channel: ChannelId, text: &str) -> Result<()> {
        self.write(text)
    }

    async fn show_disconnected(&self, handle: &DisplayHandle) -> Result<()> {
        self.write(&format!("[#{}] {}", handle.message_id, DISCONNECTED_TEXT))
    }
}
