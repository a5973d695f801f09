//! Conversation history model.
//!
//! Histories are persisted as JSON by the storage backend, so the types here
//! carry serde derives and the JSON helpers the persistence layer expects.

use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The persona/instruction message.
    System,
    /// The human user.
    User,
    /// The model.
    Assistant,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who authored the message.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// A user-authored message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// A model-authored message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// A system/persona message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// A user's stored conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationHistory {
    /// Messages in chronological order.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Name of the personality template in use.
    #[serde(default = "default_personality")]
    pub personality: String,
}

fn default_personality() -> String {
    "default".to_string()
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            personality: default_personality(),
        }
    }
}

impl ConversationHistory {
    /// An empty history with the default personality.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty history with the given personality.
    pub fn with_personality(personality: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            personality: personality.into(),
        }
    }

    /// Appends a message, dropping the oldest entries beyond `max_len`.
    pub fn push(&mut self, message: ChatMessage, max_len: usize) {
        self.messages.push(message);
        if self.messages.len() > max_len {
            let excess = self.messages.len() - max_len;
            self.messages.drain(..excess);
        }
    }

    /// Parses a history from its stored JSON form.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Serializes the history to its stored JSON form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
