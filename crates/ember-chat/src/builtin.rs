//! Built-in handler set for the chat pipeline.
//!
//! [`install`] wires the stock reaction chain onto a bus:
//!
//! - `log` (priority 10) — structured log of the inbound message.
//! - `persist` (priority 5) — appends the user message to the store.
//! - `reply` (priority 5, registered after `persist`) — generates the reply,
//!   deposits it in the event's reply slot, persists the assistant message,
//!   and posts a nested [`MessageSent`] dispatch.
//! - `log_outbound` (priority 0 on [`MessageSent`]).
//!
//! Priorities make the order explicit: logging always sees the message even
//! if a higher layer later cancels at priority > 5, and persistence runs
//! before reply generation so the model sees the message it is answering.
//!
//! All collaborators are injected through [`ChatPipeline`]; nothing here
//! reaches for globals.

use std::sync::Arc;

use tracing::{debug, info};

use ember_core::{EventBus, HandlerError};

use crate::events::{MessageReceived, MessageSent};
use crate::history::ChatMessage;
use crate::model::{GenerationOptions, ModelRegistry};
use crate::store::ConversationStore;

/// Priority of the inbound logging handler.
pub const LOG_PRIORITY: i32 = 10;
/// Priority of the persistence handler.
pub const PERSIST_PRIORITY: i32 = 5;
/// Priority of the reply-generation handler; ties with persistence and is
/// registered after it, so persistence always runs first.
pub const REPLY_PRIORITY: i32 = 5;

/// Collaborators of the built-in handlers.
pub struct ChatPipeline {
    /// Conversation persistence backend.
    pub store: Arc<dyn ConversationStore>,
    /// Model clients for reply generation.
    pub models: Arc<ModelRegistry>,
    /// Maximum stored messages per conversation; oldest are dropped.
    pub max_history_length: usize,
    /// Personality assigned to conversations that have no stored history.
    pub personality: String,
    /// Sampling temperature forwarded to every model call.
    pub temperature: f64,
}

/// Registers the built-in handlers on `bus`.
pub fn install(bus: &Arc<EventBus>, pipeline: ChatPipeline) {
    let ChatPipeline {
        store,
        models,
        max_history_length,
        personality,
        temperature,
    } = pipeline;

    bus.on_fn::<MessageReceived, _>(LOG_PRIORITY, |event| {
        info!(user = %event.user_id, text = %event.text, "inbound message");
        Ok(())
    });

    let persist_store = Arc::clone(&store);
    bus.on::<MessageReceived, _, _>(PERSIST_PRIORITY, move |event| {
        let store = Arc::clone(&persist_store);
        let personality = personality.clone();
        async move {
            let mut history = store
                .load(&event.user_id)
                .await
                .map_err(HandlerError::from_error)?;
            if history.messages.is_empty() {
                history.personality = personality;
            }
            history.push(ChatMessage::user(event.text.clone()), max_history_length);
            store
                .save(&event.user_id, &history)
                .await
                .map_err(HandlerError::from_error)
        }
    });

    let reply_bus = Arc::clone(bus);
    bus.on::<MessageReceived, _, _>(REPLY_PRIORITY, move |event| {
        let store = Arc::clone(&store);
        let models = Arc::clone(&models);
        let bus = Arc::clone(&reply_bus);
        async move {
            let mut history = store
                .load(&event.user_id)
                .await
                .map_err(HandlerError::from_error)?;
            let client = models.default_client().map_err(HandlerError::from_error)?;
            let options = GenerationOptions { temperature };
            let response = client
                .generate(&history.messages, &event.user_id, options)
                .await
                .map_err(HandlerError::from_error)?;

            event.set_reply(response.clone());
            history.push(ChatMessage::assistant(response.clone()), max_history_length);
            store
                .save(&event.user_id, &history)
                .await
                .map_err(HandlerError::from_error)?;

            debug!(user = %event.user_id, "reply generated, announcing delivery");
            bus.post(MessageSent {
                user_id: event.user_id.clone(),
                text: event.text.clone(),
                response,
            })
            .await
            .map_err(HandlerError::from_error)?;
            Ok(())
        }
    });

    bus.on_fn::<MessageSent, _>(0, |event| {
        info!(user = %event.user_id, response = %event.response, "reply delivered");
        Ok(())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::history::Role;
    use crate::model::{ModelClient, ModelError};
    use crate::store::MemoryStore;

    struct EchoModel;

    #[async_trait]
    impl ModelClient for EchoModel {
        async fn generate(
            &self,
            messages: &[ChatMessage],
            _user_id: &str,
            _options: GenerationOptions,
        ) -> Result<String, ModelError> {
            let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
            Ok(format!("echo: {last}"))
        }
    }

    struct BrokenModel;

    #[async_trait]
    impl ModelClient for BrokenModel {
        async fn generate(
            &self,
            _messages: &[ChatMessage],
            _user_id: &str,
            _options: GenerationOptions,
        ) -> Result<String, ModelError> {
            Err(ModelError::Request("upstream 503".into()))
        }
    }

    /// Records the options of the last call and replies with a fixed string.
    struct RecordingModel {
        seen: Mutex<Option<GenerationOptions>>,
    }

    #[async_trait]
    impl ModelClient for RecordingModel {
        async fn generate(
            &self,
            _messages: &[ChatMessage],
            _user_id: &str,
            options: GenerationOptions,
        ) -> Result<String, ModelError> {
            *self.seen.lock() = Some(options);
            Ok("ok".to_string())
        }
    }

    fn pipeline(model: Arc<dyn ModelClient>, max_len: usize) -> (Arc<EventBus>, Arc<MemoryStore>) {
        pipeline_with(model, max_len, "default", 0.7)
    }

    fn pipeline_with(
        model: Arc<dyn ModelClient>,
        max_len: usize,
        personality: &str,
        temperature: f64,
    ) -> (Arc<EventBus>, Arc<MemoryStore>) {
        let bus = Arc::new(EventBus::new());
        let store = MemoryStore::shared();
        let models = Arc::new(ModelRegistry::new());
        models.insert("test", model);
        install(
            &bus,
            ChatPipeline {
                store: Arc::clone(&store) as Arc<dyn ConversationStore>,
                models,
                max_history_length: max_len,
                personality: personality.to_string(),
                temperature,
            },
        );
        (bus, store)
    }

    #[tokio::test]
    async fn message_flows_through_log_persist_reply() {
        let (bus, store) = pipeline(Arc::new(EchoModel), 20);

        let delivered = Arc::new(Mutex::new(None));
        let probe = Arc::clone(&delivered);
        bus.on_fn::<MessageSent, _>(10, move |event| {
            *probe.lock() = Some(event.response.clone());
            Ok(())
        });

        let event = Arc::new(MessageReceived::new("42", "hello"));
        let cancelled = bus.post_arc(Arc::clone(&event)).await.unwrap();

        assert!(!cancelled);
        assert_eq!(event.reply().as_deref(), Some("echo: hello"));
        assert_eq!(delivered.lock().as_deref(), Some("echo: hello"));

        let history = store.load("42").await.unwrap();
        let roles: Vec<Role> = history.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(history.messages[1].content, "echo: hello");
    }

    #[tokio::test]
    async fn model_failure_is_contained() {
        let (bus, store) = pipeline(Arc::new(BrokenModel), 20);

        let event = Arc::new(MessageReceived::new("42", "hello"));
        // MessageReceived swallows handler failures, so the dispatch
        // completes instead of erroring out.
        let cancelled = bus.post_arc(Arc::clone(&event)).await.unwrap();

        assert!(!cancelled);
        assert!(event.reply().is_none());
        // The persist handler already ran; only the reply is missing.
        let history = store.load("42").await.unwrap();
        assert_eq!(history.messages.len(), 1);
        assert_eq!(history.messages[0].role, Role::User);
    }

    #[tokio::test]
    async fn configured_personality_seeds_new_conversations() {
        let (bus, store) = pipeline_with(Arc::new(EchoModel), 20, "pirate", 0.7);

        // A conversation with prior messages keeps its own personality.
        let mut existing = crate::history::ConversationHistory::with_personality("scholar");
        existing.push(ChatMessage::user("earlier"), 20);
        store.save("7", &existing).await.unwrap();

        bus.post(MessageReceived::new("42", "hello")).await.unwrap();
        bus.post(MessageReceived::new("7", "again")).await.unwrap();

        assert_eq!(store.load("42").await.unwrap().personality, "pirate");
        assert_eq!(store.load("7").await.unwrap().personality, "scholar");
    }

    #[tokio::test]
    async fn configured_temperature_reaches_the_model() {
        let model = Arc::new(RecordingModel {
            seen: Mutex::new(None),
        });
        let client = Arc::clone(&model) as Arc<dyn ModelClient>;
        let (bus, _store) = pipeline_with(client, 20, "default", 0.2);

        bus.post(MessageReceived::new("42", "hello")).await.unwrap();

        assert_eq!(
            *model.seen.lock(),
            Some(GenerationOptions { temperature: 0.2 })
        );
    }

    #[tokio::test]
    async fn history_stays_within_the_configured_limit() {
        let (bus, store) = pipeline(Arc::new(EchoModel), 2);

        for text in ["one", "two", "three"] {
            bus.post(MessageReceived::new("42", text)).await.unwrap();
        }

        let history = store.load("42").await.unwrap();
        assert_eq!(history.messages.len(), 2);
    }
}
