//! Handler model for the dispatch core.
//!
//! A [`Handler`] is a tagged callable: either a plain synchronous function or
//! an async one. The dispatcher invokes both through the same
//! [`invoke`](Handler::invoke) interface and runs them strictly one at a
//! time, so a handler never races another handler of the same dispatch.
//!
//! Handlers are type-erased at registration time. The typed constructors
//! ([`from_fn`](Handler::from_fn) and [`from_async_fn`](Handler::from_async_fn))
//! wrap a closure over a concrete event type `E` and downcast the erased
//! event back to `E` on invocation. Because the [`EventBus`](crate::bus::EventBus)
//! keys handler lists by `TypeId`, that downcast cannot fail in practice; a
//! mismatch is still reported as a [`HandlerError`] rather than a panic.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::{HandlerError, HandlerResult};
use crate::event::{Event, downcast_arc};

/// Identifier returned by handler registration, used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl HandlerId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

type SyncFn = dyn Fn(&Arc<dyn Event>) -> HandlerResult + Send + Sync;
type AsyncFn = dyn Fn(Arc<dyn Event>) -> BoxFuture<'static, HandlerResult> + Send + Sync;

/// A registered unit of reaction to an event kind.
///
/// Cloning a `Handler` clones the `Arc` around the underlying callable, so
/// clones compare equal under [`ptr_eq`](Handler::ptr_eq).
#[derive(Clone)]
pub enum Handler {
    /// A synchronous handler, run to completion without suspending.
    Sync(Arc<SyncFn>),
    /// An async handler, awaited before the next handler runs.
    Async(Arc<AsyncFn>),
}

impl Handler {
    /// Wraps a synchronous closure over a concrete event type.
    pub fn from_fn<E, F>(f: F) -> Self
    where
        E: Event,
        F: Fn(&E) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(move |event| {
            let typed = event
                .as_any()
                .downcast_ref::<E>()
                .ok_or_else(|| mismatch::<E>(event))?;
            f(typed)
        }))
    }

    /// Wraps an async closure over a concrete event type.
    ///
    /// The closure receives an owned `Arc` of the event so its future can
    /// outlive the call frame and be awaited by the dispatcher.
    pub fn from_async_fn<E, F, Fut>(f: F) -> Self
    where
        E: Event,
        F: Fn(Arc<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::Async(Arc::new(move |event| match downcast_arc::<E>(&event) {
            Some(typed) => f(typed).boxed(),
            None => {
                let err = mismatch::<E>(&event);
                async move { Err(err) }.boxed()
            }
        }))
    }

    /// Invokes the handler, awaiting async handlers to completion.
    pub async fn invoke(&self, event: Arc<dyn Event>) -> HandlerResult {
        match self {
            Handler::Sync(f) => f(&event),
            Handler::Async(f) => f(event).await,
        }
    }

    /// Whether two handlers share the same underlying callable.
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        match (self, other) {
            (Handler::Sync(a), Handler::Sync(b)) => Arc::ptr_eq(a, b),
            (Handler::Async(a), Handler::Async(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handler::Sync(_) => f.write_str("Handler::Sync"),
            Handler::Async(_) => f.write_str("Handler::Async"),
        }
    }
}

fn mismatch<E: Event>(event: &Arc<dyn Event>) -> HandlerError {
    HandlerError::msg(format!(
        "event type mismatch: expected '{}', got '{}'",
        std::any::type_name::<E>(),
        event.event_name(),
    ))
}
