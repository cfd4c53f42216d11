//! Conversation and message types for the chat side panel.
//!
//! A conversation is an ordered, append-only list of messages plus a title.
//! Messages have no identity beyond their position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::id::{EntityId, now_not_before};

/// Title every conversation starts with until it is derived or set.
pub const DEFAULT_CONVERSATION_TITLE: &str = "New conversation";

/// Maximum number of characters taken from the first user message for a
/// derived title.
pub const DERIVED_TITLE_CHARS: usize = 30;

/// Stored history per conversation. Older messages are dropped on save.
pub const DEFAULT_MAX_STORED_MESSAGES: usize = 50;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// A chat conversation.
///
/// Serialized with camelCase timestamps so snapshots stay readable by the
/// browser front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// A fresh, empty conversation with the default title.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            title: DEFAULT_CONVERSATION_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the title is still the placeholder.
    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_CONVERSATION_TITLE
    }

    /// Append a message and bump `updated_at`.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.touch();
    }

    /// Bump `updated_at` without going backwards.
    pub fn touch(&mut self) {
        self.updated_at = now_not_before(self.updated_at);
    }

    /// Drop the oldest messages so at most `max` remain. Returns how many
    /// were dropped.
    pub fn trim_history(&mut self, max: usize) -> usize {
        let excess = self.messages.len().saturating_sub(max);
        self.messages.drain(..excess);
        excess
    }

    /// Replace the default title with one derived from the first user
    /// message. Returns true if the title changed.
    ///
    /// A title that is no longer the default (derived earlier or set by the
    /// user) is left alone.
    pub fn derive_title(&mut self) -> bool {
        if !self.has_default_title() {
            return false;
        }
        let Some(first) = self
            .messages
            .iter()
            .find(|m| m.role == MessageRole::User)
        else {
            return false;
        };
        let trimmed = first.content.trim();
        if trimmed.is_empty() {
            return false;
        }

        let mut title: String = trimmed.chars().take(DERIVED_TITLE_CHARS).collect();
        if trimmed.chars().count() > DERIVED_TITLE_CHARS {
            title.push('…');
        }
        self.title = title;
        true
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Backup document for conversations, written by `chat export`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationExport {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub conversations: Vec<Conversation>,
}

impl ConversationExport {
    pub fn new(conversations: Vec<Conversation>) -> Self {
        Self {
            version: crate::journal::EXPORT_FORMAT_VERSION.to_string(),
            export_date: Utc::now(),
            conversations,
        }
    }
}
