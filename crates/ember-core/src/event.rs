//! Event kinds for the dispatch core.
//!
//! An event kind is a concrete type implementing [`Event`]. The kind decides
//! its own payload shape (ordinary struct fields) and its error policy; the
//! handler list for a kind lives in the [`EventBus`](crate::bus::EventBus)
//! that the kind is registered on, keyed by `TypeId`, so registering a
//! handler affects every future dispatch of that kind on that bus.
//!
//! Events are type-erased as `Arc<dyn Event>` while a dispatch is in flight
//! and recovered by downcasting, the same way handlers receive their typed
//! payload.
//!
//! # Example
//!
//! ```rust,ignore
//! use ember_core::{Event, HandlerError};
//!
//! struct MessageReceived {
//!     user_id: String,
//!     text: String,
//! }
//!
//! impl Event for MessageReceived {
//!     fn event_name(&self) -> &'static str {
//!         "message_received"
//!     }
//!
//!     // Swallow handler failures instead of aborting the dispatch.
//!     fn handle_exception(&self, _error: &HandlerError) -> bool {
//!         true
//!     }
//!
//!     fn as_any(&self) -> &dyn std::any::Any {
//!         self
//!     }
//!
//!     fn into_any(self: std::sync::Arc<Self>) -> std::sync::Arc<dyn std::any::Any + Send + Sync> {
//!         self
//!     }
//! }
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::error::HandlerError;

/// The base trait for all dispatchable events.
pub trait Event: Any + Send + Sync {
    /// Returns the human-readable name of this event kind.
    fn event_name(&self) -> &'static str;

    /// Error policy for handlers of this kind.
    ///
    /// Called when a handler fails during dispatch. Returning `true` swallows
    /// the error and lets the remaining handlers run; returning `false`
    /// aborts the dispatch and propagates the error to the caller.
    ///
    /// The default is to propagate.
    fn handle_exception(&self, error: &HandlerError) -> bool {
        let _ = error;
        false
    }

    /// Returns a reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Converts an `Arc<Self>` into an `Arc<dyn Any>` for owned downcasting.
    ///
    /// Needed because async handlers hold the event across await points and
    /// therefore receive an owned `Arc` of the concrete type.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Recovers the concrete event type from an erased instance.
///
/// Returns `None` when the instance is not of kind `E`.
pub fn downcast_arc<E: Event>(event: &Arc<dyn Event>) -> Option<Arc<E>> {
    Arc::clone(event).into_any().downcast::<E>().ok()
}
