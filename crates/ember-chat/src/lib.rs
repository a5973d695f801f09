//! # Ember Chat
//!
//! The chat domain layer of the Ember bot plugin, built on the
//! [`ember_core`] event bus.
//!
//! This crate owns:
//!
//! - the event kinds of the pipeline ([`MessageReceived`], [`MessageSent`]);
//! - the conversation history model ([`ConversationHistory`]);
//! - the boundary traits the core treats as external collaborators:
//!   [`ConversationStore`] for the SQL layer and [`ModelClient`] for the
//!   model-inference APIs;
//! - the built-in handler set ([`builtin::install`]) that logs, persists,
//!   generates, and announces replies.
//!
//! The transport layer constructs a [`MessageReceived`], posts it through an
//! [`EventBus`](ember_core::EventBus), and reads the generated reply off the
//! event afterwards; a [`MessageSent`] dispatch is nested inside reply
//! generation for delivery-side handlers.

pub mod builtin;
pub mod events;
pub mod history;
pub mod model;
pub mod store;

pub use builtin::{ChatPipeline, install};
pub use events::{MessageReceived, MessageSent};
pub use history::{ChatMessage, ConversationHistory, Role};
pub use model::{GenerationOptions, ModelClient, ModelError, ModelRegistry};
pub use store::{ConversationStore, MemoryStore, StoreError};
