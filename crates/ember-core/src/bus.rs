//! The event bus: registry, dispatcher, and entry points.
//!
//! The [`EventBus`] owns one [`HandlerList`] per event kind, keyed by the
//! kind's `TypeId`. The registry is explicit state: components that need to
//! register or post events receive the bus at construction time instead of
//! reaching for a global.
//!
//! # Dispatch
//!
//! One dispatch runs all handlers of one kind strictly sequentially, in
//! (priority descending, registration order ascending) order, against a
//! snapshot of the list taken when the dispatch starts:
//!
//! 1. A fresh [`ActiveDispatch`] context is installed as the task-local
//!    current event.
//! 2. Handlers run one at a time; async handlers are awaited before the next
//!    handler is considered.
//! 3. Cancellation is checked *between* handlers: a handler that cancels
//!    guarantees no later handler runs, but is never itself interrupted.
//! 4. A failing handler consults the event's
//!    [`handle_exception`](Event::handle_exception) policy: swallow and
//!    continue, or abort the dispatch and propagate.
//! 5. The context is torn down on every exit path and the final cancellation
//!    state is returned.
//!
//! # Entry points
//!
//! [`post`](EventBus::post) is the suspending entry for use inside a runtime.
//! [`post_blocking`](EventBus::post_blocking) is for plain synchronous
//! callers; it refuses to run inside an async runtime and otherwise drives
//! the dispatch on a dedicated current-thread runtime.
//!
//! # Example
//!
//! ```rust,ignore
//! use ember_core::{EventBus, context};
//!
//! let bus = EventBus::new();
//! bus.on::<MessageReceived, _, _>(10, |event| async move {
//!     tracing::info!(user = %event.user_id, "message in");
//!     Ok(())
//! });
//!
//! let cancelled = bus.post(MessageReceived::new("42", "hi")).await?;
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{Instrument, Level, debug, span, warn};

use crate::context::{self, ActiveDispatch};
use crate::error::{DispatchError, HandlerResult};
use crate::event::Event;
use crate::handler::{Handler, HandlerId};
use crate::list::HandlerList;

/// Typed, priority-ordered, cancellable in-process event bus.
#[derive(Default)]
pub struct EventBus {
    lists: RwLock<HashMap<TypeId, Arc<HandlerList>>>,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handler list for kind `E`, creating it if absent.
    ///
    /// The list is shared by every dispatch of `E` on this bus.
    pub fn handlers<E: Event>(&self) -> Arc<HandlerList> {
        if let Some(list) = self.lists.read().get(&TypeId::of::<E>()) {
            return Arc::clone(list);
        }
        let mut lists = self.lists.write();
        Arc::clone(lists.entry(TypeId::of::<E>()).or_default())
    }

    /// Registers a pre-built handler for kind `E`.
    pub fn subscribe<E: Event>(&self, priority: i32, handler: Handler) -> HandlerId {
        self.handlers::<E>().add(handler, priority)
    }

    /// Registers an async handler for kind `E`.
    pub fn on<E, F, Fut>(&self, priority: i32, f: F) -> HandlerId
    where
        E: Event,
        F: Fn(Arc<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.subscribe::<E>(priority, Handler::from_async_fn(f))
    }

    /// Registers a synchronous handler for kind `E`.
    pub fn on_fn<E, F>(&self, priority: i32, f: F) -> HandlerId
    where
        E: Event,
        F: Fn(&E) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe::<E>(priority, Handler::from_fn(f))
    }

    /// Removes the registration `id` from kind `E`'s list.
    ///
    /// No-op returning `false` if the registration is gone already. A
    /// dispatch of `E` already in flight keeps iterating its snapshot.
    pub fn unsubscribe<E: Event>(&self, id: HandlerId) -> bool {
        match self.lists.read().get(&TypeId::of::<E>()) {
            Some(list) => list.remove(id),
            None => false,
        }
    }

    /// Suspending entry point: dispatches `event` to its handlers.
    ///
    /// Returns the final cancellation state: `true` when some handler
    /// cancelled the dispatch, `false` when all handlers ran.
    pub async fn post<E: Event>(&self, event: E) -> Result<bool, DispatchError> {
        self.post_arc(Arc::new(event)).await
    }

    /// Like [`post`](Self::post), for events the caller keeps a handle to.
    pub async fn post_arc<E: Event>(&self, event: Arc<E>) -> Result<bool, DispatchError> {
        let list = self.lists.read().get(&TypeId::of::<E>()).cloned();
        let Some(list) = list else {
            debug!(event = event.event_name(), "no handlers registered");
            return Ok(false);
        };
        self.dispatch(event, list).await
    }

    /// Blocking entry point, usable only outside any async runtime.
    ///
    /// Fails fast with [`DispatchError::NestedRuntime`] when a tokio runtime
    /// is current on the calling thread; blocking there would deadlock the
    /// worker. Otherwise the dispatch is driven to completion on a dedicated
    /// current-thread runtime.
    pub fn post_blocking<E: Event>(&self, event: E) -> Result<bool, DispatchError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(DispatchError::NestedRuntime);
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(DispatchError::Runtime)?;
        runtime.block_on(self.post(event))
    }

    async fn dispatch(
        &self,
        event: Arc<dyn Event>,
        list: Arc<HandlerList>,
    ) -> Result<bool, DispatchError> {
        let event_name = event.event_name();
        let span = span!(Level::DEBUG, "dispatch", event = event_name);

        let active = Arc::new(ActiveDispatch::new(Arc::clone(&event)));
        let snapshot = list.snapshot();

        let run = {
            let active = Arc::clone(&active);
            async move {
                for entry in snapshot {
                    if active.is_cancelled() {
                        debug!(event = event_name, "dispatch cancelled, skipping remaining handlers");
                        break;
                    }
                    if let Err(error) = entry.handler().invoke(Arc::clone(&event)).await {
                        if event.handle_exception(&error) {
                            warn!(event = event_name, error = %error, "handler failed, continuing");
                            continue;
                        }
                        return Err(DispatchError::Handler {
                            event: event_name,
                            source: error,
                        });
                    }
                }
                Ok(())
            }
        };

        // The scope tears the context down on every exit path, so an aborted
        // dispatch never leaks its context into the caller's task.
        context::scope(Arc::clone(&active), run).instrument(span).await?;
        Ok(active.is_cancelled())
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("kinds", &self.lists.read().len())
            .finish()
    }
}
