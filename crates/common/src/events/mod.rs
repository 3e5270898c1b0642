//! Synchronous event fan-out
//!
//! [`EventRegistry`] keeps a list of observers and calls each one, in
//! subscription order, for every published event. Dispatch happens on the
//! publisher's thread. Handlers must not block; anything async should be
//! spawned from inside the handler.
//!
//! The handler list is snapshotted before dispatch, so a handler may
//! subscribe or unsubscribe without deadlocking. Changes take effect from
//! the next publish.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;
type Filter<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

struct Observer<E> {
    id: u64,
    filter: Option<Filter<E>>,
    handler: Handler<E>,
}

impl<E> Clone for Observer<E> {
    fn clone(&self) -> Self {
        Self { id: self.id, filter: self.filter.clone(), handler: Arc::clone(&self.handler) }
    }
}

/// Handle returned by [`EventRegistry::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

impl Subscription {
    #[must_use]
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Observer registry with synchronous fan-out.
///
/// Cloning shares the underlying observer list.
pub struct EventRegistry<E> {
    observers: Arc<RwLock<Vec<Observer<E>>>>,
    next_id: Arc<AtomicU64>,
}

impl<E> Clone for EventRegistry<E> {
    fn clone(&self) -> Self {
        Self { observers: Arc::clone(&self.observers), next_id: Arc::clone(&self.next_id) }
    }
}

impl<E> Default for EventRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry").field("observers", &self.len()).finish()
    }
}

impl<E> EventRegistry<E> {
    #[must_use]
    pub fn new() -> Self {
        Self { observers: Arc::new(RwLock::new(Vec::new())), next_id: Arc::new(AtomicU64::new(1)) }
    }

    /// Register a handler for every event.
    pub fn subscribe<H>(&self, handler: H) -> Subscription
    where
        H: Fn(&E) + Send + Sync + 'static,
    {
        self.register(None, Arc::new(handler))
    }

    /// Register a handler that only sees events accepted by `filter`.
    pub fn subscribe_filtered<F, H>(&self, filter: F, handler: H) -> Subscription
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
        H: Fn(&E) + Send + Sync + 'static,
    {
        self.register(Some(Arc::new(filter)), Arc::new(handler))
    }

    /// Remove a handler. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|o| o.id != subscription.0);
        observers.len() != before
    }

    /// Deliver `event` to every matching observer. Returns how many
    /// handlers ran.
    pub fn publish(&self, event: &E) -> usize {
        let snapshot: Vec<Observer<E>> = self.observers.read().clone();

        let mut delivered = 0;
        for observer in &snapshot {
            if observer.filter.as_ref().is_some_and(|accept| !accept(event)) {
                continue;
            }
            (observer.handler)(event);
            delivered += 1;
        }

        trace!(observers = snapshot.len(), delivered, "event published");
        delivered
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    fn register(&self, filter: Option<Filter<E>>, handler: Handler<E>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.observers.write().push(Observer { id, filter, handler });
        Subscription(id)
    }
}
