//! # Ember Runtime
//!
//! Configuration, logging, and wiring for the Ember bot plugin.
//!
//! The runtime does not own a transport: the surrounding bot framework
//! delivers messages. What it owns is the glue — loading [`config`],
//! installing [`logging`], and [`bootstrap`]ing an event bus with the
//! built-in chat handlers wired to the injected persistence and model
//! collaborators.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ember_chat::{MemoryStore, ModelRegistry};
//! use ember_runtime::{bootstrap, config::ConfigLoader, logging};
//!
//! let config = ConfigLoader::new().load()?;
//! logging::init(&config.logging)?;
//!
//! let models = Arc::new(ModelRegistry::new());
//! models.insert("openai", my_openai_client);
//!
//! let bus = bootstrap(&config, MemoryStore::shared(), models);
//! // hand `bus` to the transport; it posts MessageReceived events.
//! ```

pub mod config;
pub mod logging;

use std::sync::Arc;

use tracing::warn;

use ember_chat::{ChatPipeline, ConversationStore, ModelRegistry, install};
use ember_core::EventBus;

pub use config::{ConfigError, ConfigLoader, EmberConfig};

/// Builds an event bus with the built-in chat handlers installed.
///
/// The configured default model is selected when it is registered;
/// otherwise the registry keeps its first-registered default and a warning
/// is logged.
pub fn bootstrap(
    config: &EmberConfig,
    store: Arc<dyn ConversationStore>,
    models: Arc<ModelRegistry>,
) -> Arc<EventBus> {
    match models.get(&config.model.default_model) {
        Ok(_) => models.set_default(config.model.default_model.as_str()),
        Err(_) => warn!(
            model = %config.model.default_model,
            "configured default model is not registered, keeping registry default"
        ),
    }

    let bus = Arc::new(EventBus::new());
    install(
        &bus,
        ChatPipeline {
            store,
            models,
            max_history_length: config.model.max_history_length,
            personality: config.model.personality.clone(),
            temperature: config.model.temperature,
        },
    );
    bus
}
