//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! The dispatch core and the chat handlers emit `tracing` spans and events;
//! this module installs a formatted subscriber for them. The filter comes
//! from `RUST_LOG` when set, otherwise from the configured level.
//!
//! # Example
//!
//! ```rust,ignore
//! use ember_runtime::{config::ConfigLoader, logging};
//!
//! let config = ConfigLoader::new().load()?;
//! logging::init(&config.logging);
//! ```

use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Installs the global subscriber from the logging configuration.
///
/// Fails if a global subscriber is already set, which commonly happens in
/// tests; use [`try_init`] there.
pub fn init(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));
    let layer = fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()?;

    info!(level = %config.level, "logging initialized");
    Ok(())
}

/// Like [`init`], but quietly keeps an already-installed subscriber.
pub fn try_init(config: &LoggingConfig) {
    let _ = init(config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_init_is_tolerated() {
        let config = LoggingConfig::default();
        try_init(&config);
        // The second call hits the already-installed subscriber path.
        try_init(&config);
        assert!(init(&config).is_err());
    }
}
