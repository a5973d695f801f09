//! Persistence boundary.
//!
//! The core never touches a database; handlers consume a
//! [`ConversationStore`] trait object injected at wiring time. SQL-backed
//! implementations live outside this crate. [`MemoryStore`] is the
//! process-local reference implementation, which doubles as the cache layer
//! and the test double.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;

use crate::history::ConversationHistory;

/// Errors from a conversation storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected or failed the operation.
    #[error("storage backend failure: {0}")]
    Backend(String),

    /// A stored row could not be decoded.
    #[error("corrupt stored conversation")]
    Corrupt(#[from] serde_json::Error),
}

/// Read/write access to per-user conversation rows.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Loads a user's history; an empty history if none is stored.
    async fn load(&self, user_id: &str) -> Result<ConversationHistory, StoreError>;

    /// Overwrites a user's stored history.
    async fn save(&self, user_id: &str, history: &ConversationHistory) -> Result<(), StoreError>;

    /// Deletes a user's stored history.
    ///
    /// None of the built-in handlers call this; it backs the
    /// clear-conversation command in the transport's command layer.
    async fn clear(&self, user_id: &str) -> Result<(), StoreError>;
}

/// In-memory store, keyed by user id.
#[derive(Default)]
pub struct MemoryStore {
    conversations: RwLock<HashMap<String, ConversationHistory>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store behind an `Arc`, ready for injection.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn load(&self, user_id: &str) -> Result<ConversationHistory, StoreError> {
        Ok(self
            .conversations
            .read()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, user_id: &str, history: &ConversationHistory) -> Result<(), StoreError> {
        self.conversations
            .write()
            .insert(user_id.to_string(), history.clone());
        Ok(())
    }

    async fn clear(&self, user_id: &str) -> Result<(), StoreError> {
        self.conversations.write().remove(user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::ChatMessage;

    #[tokio::test]
    async fn load_of_unknown_user_is_empty() {
        let store = MemoryStore::new();
        let history = store.load("42").await.unwrap();
        assert!(history.messages.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_then_clear() {
        let store = MemoryStore::new();
        let mut history = ConversationHistory::new();
        history.push(ChatMessage::user("hello"), 20);

        store.save("42", &history).await.unwrap();
        assert_eq!(store.load("42").await.unwrap(), history);

        store.clear("42").await.unwrap();
        assert!(store.load("42").await.unwrap().messages.is_empty());
    }
}
