//! Configuration loading using figment.
//!
//! Sources are layered, lowest to highest priority:
//!
//! 1. Built-in defaults
//! 2. `ember.toml` (or an explicitly given file)
//! 3. Environment variables (`EMBER_*`, with `__` as the nesting separator)
//!
//! # Environment Variable Mapping
//!
//! - `EMBER_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `EMBER_MODEL__DEFAULT_MODEL=openai` → `model.default_model = "openai"`
//!
//! # Example
//!
//! ```rust,ignore
//! use ember_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load()?;
//! let config = ConfigLoader::new().file("./config/ember.toml").load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source failed to parse or a field failed to deserialize.
    #[error("failed to load configuration")]
    Load(#[from] figment::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EmberConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Reply-generation settings.
    #[serde(default)]
    pub model: ModelConfig,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error).
    ///
    /// `RUST_LOG` overrides this when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Reply-generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Name of the model client to generate replies with.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Sampling temperature passed to the model backend.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Maximum stored messages per conversation.
    #[serde(default = "default_max_history_length")]
    pub max_history_length: usize,

    /// Name of the personality template for new conversations.
    #[serde(default = "default_personality")]
    pub personality: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            temperature: default_temperature(),
            max_history_length: default_max_history_length(),
            personality: default_personality(),
        }
    }
}

fn default_model() -> String {
    "openai".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_history_length() -> usize {
    20
}

fn default_personality() -> String {
    "default".to_string()
}

/// Layered configuration loader.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Creates a loader using the default file location (`ember.toml`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads from a specific file instead of `ember.toml`.
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Resolves the layered configuration.
    ///
    /// A missing file is not an error; defaults and environment variables
    /// still apply.
    pub fn load(self) -> Result<EmberConfig, ConfigError> {
        let path = self.file.unwrap_or_else(|| PathBuf::from("ember.toml"));
        if path.is_file() {
            debug!(path = %path.display(), "loading configuration file");
        }

        let config = Figment::from(Serialized::defaults(EmberConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("EMBER_").split("__"))
            .extract()?;
        Ok(config)
    }
}
