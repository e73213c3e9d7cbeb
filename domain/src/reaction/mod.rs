//! Inbound events a workflow can wait on.

use crate::approval::Decision;
use crate::core::ids::{ChannelId, MessageId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two reactions workflows understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionSymbol {
    Accept,
    Decline,
}

impl ReactionSymbol {
    pub const ACCEPT_EMOJI: &'static str = "✅";
    pub const DECLINE_EMOJI: &'static str = "❌";

    /// Map a raw emoji to a symbol; anything else is ignored by workflows.
    pub fn from_emoji(emoji: &str) -> Option<Self> {
        match emoji {
            Self::ACCEPT_EMOJI => Some(ReactionSymbol::Accept),
            Self::DECLINE_EMOJI => Some(ReactionSymbol::Decline),
            _ => None,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ReactionSymbol::Accept => Self::ACCEPT_EMOJI,
            ReactionSymbol::Decline => Self::DECLINE_EMOJI,
        }
    }

    pub fn decision(&self) -> Decision {
        match self {
            ReactionSymbol::Accept => Decision::Approve,
            ReactionSymbol::Decline => Decision::Deny,
        }
    }
}

impl fmt::Display for ReactionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.emoji())
    }
}

impl std::str::FromStr for ReactionSymbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(symbol) = Self::from_emoji(s) {
            return Ok(symbol);
        }
        match s.to_lowercase().as_str() {
            "accept" | "yes" | "y" | "approve" => Ok(ReactionSymbol::Accept),
            "decline" | "no" | "n" | "deny" => Ok(ReactionSymbol::Decline),
            _ => Err(format!("Invalid ReactionSymbol: {}", s)),
        }
    }
}

/// A reaction added to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub message: MessageId,
    pub user: UserId,
    pub emoji: String,
}

impl ReactionEvent {
    pub fn symbol(&self) -> Option<ReactionSymbol> {
        ReactionSymbol::from_emoji(&self.emoji)
    }
}

/// A message posted by a user, typically a direct-message answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyEvent {
    pub author: UserId,
    pub channel: Option<ChannelId>,
    pub content: String,
    /// URLs of uploaded attachments.
    pub attachments: Vec<String>,
}

impl ReplyEvent {
    pub fn text(author: UserId, content: impl Into<String>) -> Self {
        Self {
            author,
            channel: None,
            content: content.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, url: impl Into<String>) -> Self {
        self.attachments.push(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_known_emoji_map() {
        assert_eq!(ReactionSymbol::from_emoji("✅"), Some(ReactionSymbol::Accept));
        assert_eq!(ReactionSymbol::from_emoji("❌"), Some(ReactionSymbol::Decline));
        assert_eq!(ReactionSymbol::from_emoji("👍"), None);
    }

    #[test]
    fn test_from_str_accepts_words_and_emoji() {
        assert_eq!("yes".parse(), Ok(ReactionSymbol::Accept));
        assert_eq!("❌".parse(), Ok(ReactionSymbol::Decline));
        assert!("maybe".parse::<ReactionSymbol>().is_err());
    }

    #[test]
    fn test_event_symbol() {
        let event = ReactionEvent {
            message: MessageId(3),
            user: UserId(1),
            emoji: "✅".to_string(),
        };
        assert_eq!(event.symbol().map(|s| s.decision()), Some(Decision::Approve));
    }
}
