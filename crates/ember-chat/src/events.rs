//! Event kinds of the chat pipeline.
//!
//! Two kinds flow through the bus: [`MessageReceived`] when the transport
//! hands us a private message, and [`MessageSent`] once a reply has been
//! produced. Both swallow handler failures: one broken handler must not take
//! the conversation down, so failures are logged and the remaining handlers
//! run.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use ember_core::{Event, HandlerError};

/// A private message arrived and is about to be processed.
///
/// The payload is shared by every handler of the dispatch; the reply slot
/// has interior mutability so the reply-generation handler can deposit the
/// generated text for the transport to pick up after the dispatch returns.
pub struct MessageReceived {
    /// Platform identifier of the sender.
    pub user_id: String,
    /// Plain text content of the message.
    pub text: String,
    reply: Mutex<Option<String>>,
}

impl MessageReceived {
    /// Creates the event for an inbound message.
    pub fn new(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            text: text.into(),
            reply: Mutex::new(None),
        }
    }

    /// Deposits the generated reply.
    pub fn set_reply(&self, reply: impl Into<String>) {
        *self.reply.lock() = Some(reply.into());
    }

    /// Returns the deposited reply, if any handler produced one.
    pub fn reply(&self) -> Option<String> {
        self.reply.lock().clone()
    }
}

impl Event for MessageReceived {
    fn event_name(&self) -> &'static str {
        "message_received"
    }

    fn handle_exception(&self, error: &HandlerError) -> bool {
        warn!(user = %self.user_id, error = %error, "message handler failed, continuing");
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl std::fmt::Debug for MessageReceived {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageReceived")
            .field("user_id", &self.user_id)
            .field("text", &self.text)
            .field("has_reply", &self.reply.lock().is_some())
            .finish()
    }
}

/// A reply was produced for a message.
///
/// Posted as a nested dispatch by the reply handler, so delivery-side
/// handlers (outbound logging, bookkeeping) stay decoupled from reply
/// generation.
#[derive(Debug)]
pub struct MessageSent {
    /// Platform identifier of the recipient.
    pub user_id: String,
    /// The inbound text the reply answers.
    pub text: String,
    /// The generated reply.
    pub response: String,
}

impl Event for MessageSent {
    fn event_name(&self) -> &'static str {
        "message_sent"
    }

    fn handle_exception(&self, error: &HandlerError) -> bool {
        warn!(user = %self.user_id, error = %error, "delivery handler failed, continuing");
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
