//! # Ember Core
//!
//! The event dispatch core of the Ember bot plugin: a typed,
//! priority-ordered, cancellable in-process event bus.
//!
//! The bus decouples "something happened" (a message arrived) from "what
//! should happen" (logging, persistence, reply generation, delivery). It is
//! deliberately not a message broker: single node, in process, no
//! durability.
//!
//! ## Building blocks
//!
//! - [`Event`] — an event kind: a concrete type carrying the payload and the
//!   per-kind handler error policy.
//! - [`Handler`] — a sync or async callable registered against a kind with a
//!   priority; both variants are invoked uniformly.
//! - [`HandlerList`] — the ordered registrations for one kind: descending
//!   priority, registration order breaking ties, snapshot-isolated
//!   iteration.
//! - [`context`] — the task-local current-event slot, letting nested code
//!   reach the in-flight event and cancel the dispatch cooperatively.
//! - [`EventBus`] — the explicit registry and dispatcher, with a suspending
//!   entry point ([`EventBus::post`]) and a blocking one
//!   ([`EventBus::post_blocking`]).
//!
//! ## Guarantees
//!
//! Within one dispatch, handlers run strictly one at a time in a total order
//! that is deterministic given the list state when the dispatch started.
//! Cancellation is checked between handlers, never preempting one. Handler
//! failures are contained per dispatch and routed through the event's own
//! policy. The current-event context is always torn down, even when a
//! dispatch aborts.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ember_core::{EventBus, Event, context};
//!
//! let bus = Arc::new(EventBus::new());
//!
//! bus.on::<MessageReceived, _, _>(10, |event| async move {
//!     tracing::info!(user = %event.user_id, text = %event.text, "inbound");
//!     Ok(())
//! });
//! bus.on_fn::<MessageReceived, _>(5, |event| {
//!     if event.text.is_empty() {
//!         context::cancel()?; // nothing to reply to
//!     }
//!     Ok(())
//! });
//!
//! let cancelled = bus.post(MessageReceived::new("42", "hello")).await?;
//! ```

pub mod bus;
pub mod context;
pub mod error;
pub mod event;
pub mod handler;
pub mod list;

pub use bus::EventBus;
pub use context::ActiveDispatch;
pub use error::{DispatchError, HandlerError, HandlerResult, NoActiveContext};
pub use event::{Event, downcast_arc};
pub use handler::{Handler, HandlerId};
pub use list::{HandlerEntry, HandlerList};
