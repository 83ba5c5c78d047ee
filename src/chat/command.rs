/// Participant commands, as produced by the transport adapter.
///
/// The controller matches on this enum exhaustively; there is no string-based
/// routing past this point.
use super::types::Payload;
use crate::config::texts::{SEARCH_BUTTON, START_COMMAND, STOP_BUTTON};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the welcome text. `name` is the transport-supplied display name.
    Start { name: Option<String> },
    /// Look for a partner.
    Search,
    /// Cancel the search or leave the current chat.
    Stop,
    /// Anything else: forwarded to the partner, if any.
    Message(Payload),
}

impl Command {
    /// Classify a text message by exact match against the known commands and
    /// keyboard labels. Anything else, including a label with extra whitespace,
    /// becomes a relayable message, untouched.
    pub fn from_text(text: String) -> Self {
        let command = match text.as_str() {
            START_COMMAND => Some(Command::Start { name: None }),
            SEARCH_BUTTON => Some(Command::Search),
            STOP_BUTTON => Some(Command::Stop),
            _ => None,
        };
        command.unwrap_or_else(|| Command::Message(Payload::Text(text)))
    }

    /// Attach a display name to a `Start` command; other commands are returned as is.
    pub fn with_display_name(self, display_name: &str) -> Self {
        match self {
            Command::Start { name: None } if !display_name.is_empty() => Command::Start {
                name: Some(display_name.to_string()),
            },
            other => other,
        }
    }
}
