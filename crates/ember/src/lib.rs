//! # Ember
//!
//! An event-driven AI chat plugin core for bot frameworks.
//!
//! Ember receives private messages from a surrounding transport, runs them
//! through a typed, priority-ordered, cancellable event bus, and produces
//! replies via injected model clients, persisting conversations through an
//! injected store.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐      ┌──────────┐      ┌────────────────────────────────┐
//! │ Transport │─────▶│ EventBus │─────▶│ log ─▶ persist ─▶ reply        │
//! │ (caller)  │ post │          │      │ (priority desc, ties by order) │
//! └───────────┘      └──────────┘      └───────────┬────────────────────┘
//!                                                  │ nested dispatch
//!                                          ┌───────▼───────┐
//!                                          │ MessageSent   │
//!                                          │ log_outbound  │
//!                                          └───────────────┘
//! ```
//!
//! - **ember-core**: the event bus — registry, handler lists, per-dispatch
//!   context with cooperative cancellation, suspending and blocking entry
//!   points.
//! - **ember-chat**: event kinds, conversation history, persistence and
//!   model boundary traits, built-in handlers.
//! - **ember-runtime**: configuration, logging, bootstrap wiring.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ember::prelude::*;
//!
//! let config = ConfigLoader::new().load()?;
//! logging::init(&config.logging)?;
//!
//! let models = Arc::new(ModelRegistry::new());
//! models.insert("openai", my_client);
//! let bus = bootstrap(&config, MemoryStore::shared(), models);
//!
//! // In the transport's message callback:
//! let event = Arc::new(MessageReceived::new(user_id, text));
//! bus.post_arc(Arc::clone(&event)).await?;
//! if let Some(reply) = event.reply() {
//!     send_back(reply).await?;
//! }
//! ```

pub use ember_chat as chat;
pub use ember_core as core;
pub use ember_runtime as runtime;

/// Prelude module for convenient imports.
pub mod prelude {
    // Wiring - main entry point
    pub use ember_runtime::{ConfigLoader, EmberConfig, bootstrap};

    // Logging setup
    pub use ember_runtime::logging;

    // Bus - registration and dispatch
    pub use ember_core::{EventBus, Handler, HandlerError, HandlerId, HandlerResult, context};

    // Chat pipeline - events and collaborators
    pub use ember_chat::{
        ChatMessage, ChatPipeline, ConversationHistory, ConversationStore, GenerationOptions,
        MemoryStore, MessageReceived, MessageSent, ModelClient, ModelRegistry, install,
    };

    // Core trait for custom event kinds
    pub use ember_core::Event as __Event;
}
