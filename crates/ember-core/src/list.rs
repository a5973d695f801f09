//! Ordered handler lists.
//!
//! A [`HandlerList`] owns the `(priority, handler)` registrations for one
//! event kind and maintains the total execution order: descending priority,
//! ties broken by registration order. Registration order is tracked with a
//! per-list monotonic sequence so equal-priority ties are never arbitrary.
//!
//! Mutation and iteration are decoupled: dispatchers iterate over a
//! point-in-time [`snapshot`](HandlerList::snapshot), so handlers may
//! register or remove handlers from within a running dispatch without the
//! in-flight iteration observing the change. Mutations serialize through a
//! mutex, so concurrent registrations are never lost.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::handler::{Handler, HandlerId};

/// One registration in a [`HandlerList`].
#[derive(Clone)]
pub struct HandlerEntry {
    priority: i32,
    seq: u64,
    id: HandlerId,
    handler: Handler,
}

impl HandlerEntry {
    /// The registration priority. Higher runs earlier.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// The identifier returned by [`HandlerList::add`].
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// The registered handler.
    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}

impl std::fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("priority", &self.priority)
            .field("seq", &self.seq)
            .field("id", &self.id)
            .finish()
    }
}

/// The ordered collection of handlers for one event kind.
#[derive(Default)]
pub struct HandlerList {
    entries: Mutex<Vec<HandlerEntry>>,
    next_seq: AtomicU64,
}

impl HandlerList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler at the given priority.
    ///
    /// The entry is inserted in sorted position: after every entry of higher
    /// or equal priority, before every entry of strictly lower priority.
    /// Visible to subsequent dispatches immediately; a dispatch already
    /// iterating its snapshot is unaffected.
    pub fn add(&self, handler: Handler, priority: i32) -> HandlerId {
        let id = HandlerId::next();
        let mut entries = self.entries.lock();
        // Sequence is assigned under the lock so registration order and
        // insertion order cannot disagree.
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let at = entries.partition_point(|e| e.priority >= priority);
        entries.insert(
            at,
            HandlerEntry {
                priority,
                seq,
                id,
                handler,
            },
        );
        id
    }

    /// Removes the entry registered under `id`.
    ///
    /// Returns `false` if no such entry exists.
    pub fn remove(&self, id: HandlerId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }

    /// Removes every entry holding the same callable as `handler`.
    ///
    /// Identity is pointer equality on the underlying callable, so this
    /// removes all registrations made from clones of one `Handler`. Returns
    /// the number of entries removed; zero if the handler was never
    /// registered.
    pub fn remove_handler(&self, handler: &Handler) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|e| !e.handler.ptr_eq(handler));
        before - entries.len()
    }

    /// Returns the number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns a stable, ordered copy of the current entries.
    ///
    /// Dispatchers iterate over this copy so that concurrent `add`/`remove`
    /// calls never corrupt or redirect an in-flight iteration.
    pub fn snapshot(&self) -> Vec<HandlerEntry> {
        self.entries.lock().clone()
    }
}

impl std::fmt::Debug for HandlerList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerList")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::Arc;

    use crate::event::Event;

    struct Marker;

    impl Event for Marker {
        fn event_name(&self) -> &'static str {
            "marker"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    fn noop() -> Handler {
        Handler::from_fn::<Marker, _>(|_| Ok(()))
    }

    fn order_of(list: &HandlerList) -> Vec<HandlerId> {
        list.snapshot().iter().map(|e| e.id()).collect()
    }

    #[test]
    fn descending_priority_with_stable_ties() {
        let list = HandlerList::new();
        let low = list.add(noop(), 5);
        let high = list.add(noop(), 10);
        let low_second = list.add(noop(), 5);

        assert_eq!(order_of(&list), vec![high, low, low_second]);
    }

    #[test]
    fn reregistration_order_only_matters_on_ties() {
        // Register the same (priority) shape in a different call order; the
        // relative order of distinct priorities must be invariant.
        let list = HandlerList::new();
        let a = list.add(noop(), 5);
        let b = list.add(noop(), 10);
        let c = list.add(noop(), 1);

        assert_eq!(order_of(&list), vec![b, a, c]);
    }

    #[test]
    fn permuted_registration_is_invariant_except_on_ties() {
        let first = noop();
        let tied_a = noop();
        let tied_b = noop();
        let last = noop();

        // The same (handler, priority) pairs, registered in two different
        // call orders, one of which reverses the tied pair.
        let forward = HandlerList::new();
        forward.add(tied_a.clone(), 5);
        forward.add(first.clone(), 10);
        forward.add(tied_b.clone(), 5);
        forward.add(last.clone(), 1);

        let shuffled = HandlerList::new();
        shuffled.add(last.clone(), 1);
        shuffled.add(tied_b.clone(), 5);
        shuffled.add(first.clone(), 10);
        shuffled.add(tied_a.clone(), 5);

        let names = |list: &HandlerList| -> Vec<&'static str> {
            list.snapshot()
                .iter()
                .map(|e| {
                    if e.handler().ptr_eq(&first) {
                        "first"
                    } else if e.handler().ptr_eq(&tied_a) {
                        "tied_a"
                    } else if e.handler().ptr_eq(&tied_b) {
                        "tied_b"
                    } else {
                        "last"
                    }
                })
                .collect()
        };

        // Distinct priorities land in the same slots either way; only the
        // tied pair follows the registration order of its own run.
        assert_eq!(names(&forward), vec!["first", "tied_a", "tied_b", "last"]);
        assert_eq!(names(&shuffled), vec!["first", "tied_b", "tied_a", "last"]);
    }

    #[test]
    fn remove_by_id() {
        let list = HandlerList::new();
        let id = list.add(noop(), 0);
        assert!(list.remove(id));
        assert!(!list.remove(id));
        assert!(list.is_empty());
    }

    #[test]
    fn remove_handler_strips_all_registrations() {
        let list = HandlerList::new();
        let handler = noop();
        list.add(handler.clone(), 10);
        list.add(handler.clone(), 0);
        list.add(noop(), 5);

        assert_eq!(list.remove_handler(&handler), 2);
        assert_eq!(list.len(), 1);
        assert_eq!(list.remove_handler(&handler), 0);
    }

    #[test]
    fn snapshot_is_isolated_from_later_mutation() {
        let list = HandlerList::new();
        list.add(noop(), 0);
        let snapshot = list.snapshot();

        list.add(noop(), 0);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(list.len(), 2);
    }
}
