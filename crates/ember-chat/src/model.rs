//! Model-inference boundary.
//!
//! The reply handler treats text generation as an opaque suspend point
//! behind the [`ModelClient`] trait; the HTTP clients for the actual
//! provider APIs live outside this crate. [`ModelRegistry`] holds the named
//! clients and the configured default, mirroring how the plugin selects
//! between providers at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;

use crate::history::ChatMessage;

/// Errors from a model-inference backend.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No client is registered under the requested name.
    #[error("model '{0}' is not registered")]
    UnknownModel(String),

    /// The backend call failed.
    #[error("model request failed: {0}")]
    Request(String),
}

/// Per-call generation settings forwarded to the backend API.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature.
    pub temperature: f64,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self { temperature: 0.7 }
    }
}

/// A client for one model-inference API.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generates a reply for the given conversation.
    async fn generate(
        &self,
        messages: &[ChatMessage],
        user_id: &str,
        options: GenerationOptions,
    ) -> Result<String, ModelError>;
}

/// Named model clients with a configured default.
#[derive(Default)]
pub struct ModelRegistry {
    clients: RwLock<HashMap<String, Arc<dyn ModelClient>>>,
    default: RwLock<Option<String>>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client under `name`.
    ///
    /// The first registered client becomes the default until
    /// [`set_default`](Self::set_default) overrides it.
    pub fn insert(&self, name: impl Into<String>, client: Arc<dyn ModelClient>) {
        let name = name.into();
        self.default.write().get_or_insert_with(|| name.clone());
        self.clients.write().insert(name, client);
    }

    /// Selects the default client by name.
    pub fn set_default(&self, name: impl Into<String>) {
        *self.default.write() = Some(name.into());
    }

    /// Looks up a client by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn ModelClient>, ModelError> {
        self.clients
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownModel(name.to_string()))
    }

    /// Returns the default client.
    pub fn default_client(&self) -> Result<Arc<dyn ModelClient>, ModelError> {
        let name = self
            .default
            .read()
            .clone()
            .ok_or_else(|| ModelError::UnknownModel("default".to_string()))?;
        self.get(&name)
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.clients.read().len())
            .field("default", &self.default.read().clone())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(&'static str);

    #[async_trait]
    impl ModelClient for Canned {
        async fn generate(
            &self,
            _messages: &[ChatMessage],
            _user_id: &str,
            _options: GenerationOptions,
        ) -> Result<String, ModelError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn first_registered_client_is_the_default() {
        let registry = ModelRegistry::new();
        registry.insert("alpha", Arc::new(Canned("a")));
        registry.insert("beta", Arc::new(Canned("b")));

        let options = GenerationOptions::default();
        let reply = registry
            .default_client()
            .unwrap()
            .generate(&[], "42", options)
            .await
            .unwrap();
        assert_eq!(reply, "a");

        registry.set_default("beta");
        let reply = registry
            .default_client()
            .unwrap()
            .generate(&[], "42", options)
            .await
            .unwrap();
        assert_eq!(reply, "b");
    }

    #[test]
    fn unknown_model_is_an_error() {
        let registry = ModelRegistry::new();
        assert!(matches!(
            registry.get("missing"),
            Err(ModelError::UnknownModel(_))
        ));
        assert!(registry.default_client().is_err());
    }
}
