//! Core types for playback management

use encore_core::EndReason;
use serde::{Deserialize, Serialize};

/// Loop mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopMode {
    /// Stop when queue ends
    #[default]
    Off,

    /// Replay current track on natural finish
    Song,

    /// Restart from history when the queue runs dry
    Queue,
}

impl LoopMode {
    /// Next mode in the Off -> Song -> Queue -> Off cycle
    pub fn next(self) -> Self {
        match self {
            LoopMode::Off => LoopMode::Song,
            LoopMode::Song => LoopMode::Queue,
            LoopMode::Queue => LoopMode::Off,
        }
    }

    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            LoopMode::Off => "Off",
            LoopMode::Song => "Song",
            LoopMode::Queue => "Queue",
        }
    }
}

impl std::fmt::Display for LoopMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Events that may move playback to another track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Current track reached its end
    TrackFinished,

    /// Current track was stopped explicitly (stop/skip)
    TrackStopped,

    /// Current track failed to load or play
    TrackFailed,

    /// User asked to stop everything
    StopRequested,
}

impl Trigger {
    /// Map a backend end reason to a trigger
    ///
    /// `Replaced` yields `None`: the replacing command already moved the
    /// session on.
    pub fn from_end_reason(reason: EndReason) -> Option<Self> {
        match reason {
            EndReason::Finished => Some(Trigger::TrackFinished),
            EndReason::Stopped => Some(Trigger::TrackStopped),
            EndReason::Error => Some(Trigger::TrackFailed),
            EndReason::Replaced => None,
        }
    }
}

/// Configuration for playback state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Maximum history size (default: 10)
    pub history_size: usize,

    /// Queue view lines, current track included (default: 10)
    pub queue_display_limit: usize,

    /// Initial volume (0-`max_volume`, default: 1000)
    pub default_volume: u16,

    /// Volume change per up/down command (default: 100)
    pub volume_step: u16,

    /// Upper volume bound (default: 1000)
    pub max_volume: u16,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            history_size: 10,
            queue_display_limit: 10,
            default_volume: 1000,
            volume_step: 100,
            max_volume: 1000,
        }
    }
}
