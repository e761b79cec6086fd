//! User command surface
//!
//! Commands arrive as text (slash commands, buttons, or a console line) and
//! are parsed into [`UserCommand`]s, which the registry maps onto session
//! operations.

use encore_core::{ChannelId, GuildId};
use std::str::FromStr;
use thiserror::Error;

/// Everything a user can ask for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Join,
    Play(String),
    Previous,
    Pause,
    Resume,
    Skip,
    Stop,
    ShowQueue,
    Shuffle,
    CycleLoop,
    VolumeUp,
    VolumeDown,
}

/// Who issued a command, and from where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    pub guild: GuildId,

    /// Where replies go
    pub text_channel: ChannelId,

    /// Voice channel the caller is sitting in, if any
    pub voice_channel: Option<ChannelId>,

    /// Label shown as "requested by"
    pub requested_by: String,
}

/// Command text could not be understood
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("'play' needs a search query")]
    MissingQuery,

    #[error("unknown command '{0}'")]
    Unknown(String),
}

impl FromStr for UserCommand {
    type Err = ParseCommandError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let (name, rest) = match input.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (input, ""),
        };

        let command = match name.trim_start_matches('/').to_lowercase().as_str() {
            "" => return Err(ParseCommandError::Empty),
            "join" => UserCommand::Join,
            "play" | "p" => {
                if rest.is_empty() {
                    return Err(ParseCommandError::MissingQuery);
                }
                UserCommand::Play(rest.to_string())
            }
            "previous" | "prev" | "back" => UserCommand::Previous,
            "pause" => UserCommand::Pause,
            "resume" | "unpause" => UserCommand::Resume,
            "skip" | "next" => UserCommand::Skip,
            "stop" | "leave" => UserCommand::Stop,
            "queue" | "q" => UserCommand::ShowQueue,
            "shuffle" => UserCommand::Shuffle,
            "loop" => UserCommand::CycleLoop,
            "vol+" | "volup" => UserCommand::VolumeUp,
            "vol-" | "voldown" => UserCommand::VolumeDown,
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}
