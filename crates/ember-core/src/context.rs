//! Per-dispatch execution context and current-event lookup.
//!
//! Every dispatch owns one [`ActiveDispatch`]: the event instance in flight
//! and its cooperative cancellation flag. While the dispatch runs, the
//! context is installed in a tokio task-local slot, so deeply nested code
//! that was never handed the event explicitly can still retrieve it with
//! [`current`] and cancel the remaining handlers.
//!
//! The slot is scoped, not assigned: the dispatcher wraps its whole handler
//! loop in [`scope`], which installs the context for exactly the lifetime of
//! that future and restores the previous value on exit, including on error.
//! Nested dispatches therefore shadow the outer context and hand it back
//! when they return, and concurrent dispatches interleaved on the same
//! worker pool each see only their own context.
//!
//! # Example
//!
//! ```rust,ignore
//! use ember_core::context;
//!
//! async fn somewhere_deep_inside_a_handler() {
//!     let active = context::current().expect("called from a handler");
//!     tracing::debug!(event = active.event().event_name(), "cancelling");
//!     active.cancel();
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::NoActiveContext;
use crate::event::Event;

tokio::task_local! {
    static ACTIVE: Arc<ActiveDispatch>;
}

/// The execution context of one in-flight dispatch.
///
/// Created fresh at the start of each dispatch and valid only for its
/// duration; the dispatcher never reuses or stores it afterwards. The
/// cancellation flag starts cleared.
pub struct ActiveDispatch {
    event: Arc<dyn Event>,
    cancelled: AtomicBool,
}

impl ActiveDispatch {
    pub(crate) fn new(event: Arc<dyn Event>) -> Self {
        Self {
            event,
            cancelled: AtomicBool::new(false),
        }
    }

    /// The event instance being dispatched.
    pub fn event(&self) -> &Arc<dyn Event> {
        &self.event
    }

    /// Downcasts the event to a concrete kind.
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.event.as_any().downcast_ref()
    }

    /// Requests cooperative cancellation of this dispatch.
    ///
    /// The handler currently running is not interrupted; the dispatcher
    /// checks the flag between handlers and skips every handler not yet
    /// started.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for ActiveDispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveDispatch")
            .field("event", &self.event.event_name())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Returns the context of the dispatch currently in flight on this task.
///
/// Fails with [`NoActiveContext`] outside any dispatch; that is a programmer
/// error and should surface loudly during development.
pub fn current() -> Result<Arc<ActiveDispatch>, NoActiveContext> {
    ACTIVE.try_with(Arc::clone).map_err(|_| NoActiveContext)
}

/// Like [`current`], but `None` outside a dispatch.
pub fn try_current() -> Option<Arc<ActiveDispatch>> {
    ACTIVE.try_with(Arc::clone).ok()
}

/// Cancels the dispatch currently in flight on this task.
pub fn cancel() -> Result<(), NoActiveContext> {
    current().map(|active| active.cancel())
}

/// Runs `fut` with `active` installed as the current dispatch context.
///
/// Restores the previously installed context (possibly none) when `fut`
/// completes, whether it returns normally or propagates an error.
pub(crate) async fn scope<F>(active: Arc<ActiveDispatch>, fut: F) -> F::Output
where
    F: Future,
{
    ACTIVE.scope(active, fut).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    struct Probe;

    impl Event for Probe {
        fn event_name(&self) -> &'static str {
            "probe"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    #[tokio::test]
    async fn lookup_outside_dispatch_is_loud() {
        assert!(current().is_err());
        assert!(try_current().is_none());
        assert!(cancel().is_err());
    }

    #[tokio::test]
    async fn scope_installs_and_restores() {
        let outer = Arc::new(ActiveDispatch::new(Arc::new(Probe)));
        scope(Arc::clone(&outer), async {
            let seen = current().unwrap();
            assert!(Arc::ptr_eq(&seen, &outer));

            // Nested scope shadows and then restores the outer context.
            let inner = Arc::new(ActiveDispatch::new(Arc::new(Probe)));
            scope(Arc::clone(&inner), async {
                assert!(Arc::ptr_eq(&current().unwrap(), &inner));
            })
            .await;

            assert!(Arc::ptr_eq(&current().unwrap(), &outer));
        })
        .await;

        assert!(current().is_err());
    }

    #[tokio::test]
    async fn cancel_is_visible_through_the_slot() {
        let active = Arc::new(ActiveDispatch::new(Arc::new(Probe)));
        scope(Arc::clone(&active), async {
            cancel().unwrap();
        })
        .await;
        assert!(active.is_cancelled());
    }
}
