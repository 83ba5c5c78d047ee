use actix::prelude::*;

use super::types::{ParticipantId, Payload};
use crate::config::texts;

/// Informational messages the core sends to participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Welcome { name: Option<String> },
    Waiting,
    Matched,
    AlreadyInChat,
    SearchCancelled,
    YouLeft,
    PartnerLeft,
    NotSearching,
}

impl Notice {
    /// Stable machine-readable name, sent alongside the text.
    pub fn kind(&self) -> &'static str {
        match self {
            Notice::Welcome { .. } => "welcome",
            Notice::Waiting => "waiting",
            Notice::Matched => "matched",
            Notice::AlreadyInChat => "already_in_chat",
            Notice::SearchCancelled => "search_cancelled",
            Notice::YouLeft => "you_left",
            Notice::PartnerLeft => "partner_left",
            Notice::NotSearching => "not_searching",
        }
    }

    pub fn text(&self) -> String {
        match self {
            Notice::Welcome { name } => {
                let name = name.as_deref().unwrap_or(texts::DEFAULT_DISPLAY_NAME);
                texts::WELCOME_TEMPLATE.replace("{name}", name)
            }
            Notice::Waiting => texts::WAITING.to_string(),
            Notice::Matched => texts::MATCHED.to_string(),
            Notice::AlreadyInChat => texts::ALREADY_IN_CHAT.to_string(),
            Notice::SearchCancelled => texts::SEARCH_CANCELLED.to_string(),
            Notice::YouLeft => texts::YOU_LEFT.to_string(),
            Notice::PartnerLeft => texts::PARTNER_LEFT.to_string(),
            Notice::NotSearching => texts::NOT_SEARCHING.to_string(),
        }
    }

    /// Whether `text()` uses Markdown emphasis.
    pub fn is_markdown(&self) -> bool {
        matches!(self, Notice::Welcome { .. })
    }
}

/// A notice addressed to one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: ParticipantId,
    pub notice: Notice,
}

impl Notification {
    pub fn new(to: &ParticipantId, notice: Notice) -> Self {
        Self { to: to.clone(), notice }
    }
}

/// Anything delivered to a participant through the transport.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
#[rtype(result = "()")]
pub enum Outbound {
    Notice(Notice),
    Relayed(Payload),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_uses_display_name_or_default() {
        let text = Notice::Welcome { name: Some("Aru".into()) }.text();
        assert!(text.starts_with("👋 Привет, *Aru*!"));

        let text = Notice::Welcome { name: None }.text();
        assert!(text.contains(texts::DEFAULT_DISPLAY_NAME));
        assert!(!text.contains("{name}"));
    }

    #[test]
    fn test_only_welcome_is_markdown() {
        assert!(Notice::Welcome { name: None }.is_markdown());
        assert!(!Notice::Matched.is_markdown());
        assert_eq!(Notice::PartnerLeft.text(), texts::PARTNER_LEFT);
        assert_eq!(Notice::NotSearching.kind(), "not_searching");
    }
}
