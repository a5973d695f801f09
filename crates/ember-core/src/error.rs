//! Error types for the event dispatch core.

use thiserror::Error;

/// Error raised by a failing handler.
///
/// Handlers report failures as a message plus an optional underlying error.
/// Whether a failure aborts the dispatch is decided per event kind via
/// [`Event::handle_exception`](crate::event::Event::handle_exception).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HandlerError {
    /// Creates a handler error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a handler error wrapping an underlying error.
    pub fn from_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Returns the failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type returned by handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Errors that can abort a dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A handler failed and the event's error policy chose to propagate.
    ///
    /// Remaining handlers of that dispatch were skipped; the execution
    /// context was still torn down.
    #[error("handler failed while dispatching '{event}'")]
    Handler {
        /// Name of the event kind being dispatched.
        event: &'static str,
        #[source]
        source: HandlerError,
    },

    /// The blocking entry point was called from inside an async runtime.
    ///
    /// Blocking on a dispatch from a runtime worker would risk deadlock;
    /// use [`EventBus::post`](crate::bus::EventBus::post) instead.
    #[error("blocking dispatch is not allowed inside an async runtime")]
    NestedRuntime,

    /// The dedicated runtime for a blocking dispatch could not be built.
    #[error("failed to start dispatch runtime")]
    Runtime(#[source] std::io::Error),
}

/// Current-event lookup was attempted outside any dispatch.
///
/// This is a programmer error: [`context::current`](crate::context::current)
/// is only meaningful beneath an in-flight dispatch.
#[derive(Debug, Clone, Error)]
#[error("no event dispatch is active on this task")]
pub struct NoActiveContext;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_error_preserves_source() {
        let io = std::io::Error::other("disk full");
        let err = HandlerError::from_error(io);
        assert_eq!(err.message(), "disk full");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn dispatch_error_names_the_event() {
        let err = DispatchError::Handler {
            event: "message_received",
            source: HandlerError::msg("boom"),
        };
        assert!(err.to_string().contains("message_received"));
    }
}
