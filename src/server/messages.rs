use actix::prelude::*;
use serde::{Serialize, Deserialize};

use super::directory::Credentials;
use crate::chat::command::Command;
use crate::chat::notice::Notice;
use crate::config::texts::main_keyboard;

// Message client -> serveur
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "action", content = "data")]
pub enum ClientWsMessage {
    Start,
    Search,
    Stop,
    /// Free text. Keyboard labels and `/start` sent this way are still commands.
    Text { text: String },
    Ping,
}

impl ClientWsMessage {
    /// Turn a client frame into a core command. `Ping` carries none.
    pub fn into_command(self, display_name: &str) -> Option<Command> {
        let command = match self {
            ClientWsMessage::Start => Command::Start { name: None },
            ClientWsMessage::Search => Command::Search,
            ClientWsMessage::Stop => Command::Stop,
            ClientWsMessage::Text { text } => Command::from_text(text),
            ClientWsMessage::Ping => return None,
        };
        Some(command.with_display_name(display_name))
    }
}

// Message serveur -> client
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "action", content = "data")]
pub enum ServerWsMessage {
    /// First frame of every connection: the server-issued id and the token
    /// needed to resume it from another connection.
    Session {
        participant: String,
        token: String,
    },
    Notice {
        kind: String,
        text: String,
        markdown: bool,
        keyboard: Vec<Vec<String>>,
    },
    /// Text relayed from the partner. Binary payloads go out as binary frames.
    Relayed {
        text: String,
    },
}

impl ServerWsMessage {
    pub fn session(credentials: &Credentials) -> Self {
        Self::Session {
            participant: credentials.participant.to_string(),
            token: credentials.token.clone(),
        }
    }

    pub fn notice(notice: &Notice) -> Self {
        Self::Notice {
            kind: notice.kind().to_string(),
            text: notice.text(),
            markdown: notice.is_markdown(),
            keyboard: main_keyboard(),
        }
    }

    pub fn relayed(text: String) -> Self {
        Self::Relayed { text }
    }
}

/// Message: another connection took over this participant id.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct SessionKicked {
    pub reason: String,
}
