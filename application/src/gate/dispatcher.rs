//! Keyed dispatch table of single-shot listeners.
//!
//! [`EventDispatcher`] is the rendezvous point between the event loop and
//! waiting workflows. A workflow [`subscribe`](EventDispatcher::subscribe)s
//! to a key with a filter and receives a [`Subscription`]; the event loop
//! [`dispatch`](EventDispatcher::dispatch)es each inbound event to the first
//! live listener whose filter accepts it.
//!
//! # Resolution
//!
//! A listener is removed from the table by exactly one of:
//!
//! - `dispatch` handing it an event (the event wins),
//! - [`Subscription::deregister`] on timeout or cancellation (the timer wins),
//! - [`Subscription`]'s `Drop` when the waiter is abandoned.
//!
//! Removal and delivery happen under the same table lock, so a timeout that
//! races a matching event observes either "still registered" (the timeout
//! wins and the event is left for someone else) or "already taken" (the
//! event wins and is read back from the channel). Never both.

use super::GateOutcome;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

type Filter<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

struct Listener<E> {
    id: u64,
    filter: Filter<E>,
    tx: oneshot::Sender<E>,
}

struct Table<K, E> {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<K, Vec<Listener<E>>>>,
}

impl<K: Eq + Hash, E> Table<K, E> {
    fn remove(&self, key: &K, id: u64) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        let Some(waiting) = listeners.get_mut(key) else {
            return false;
        };
        let before = waiting.len();
        waiting.retain(|l| l.id != id);
        let removed = waiting.len() < before;
        if waiting.is_empty() {
            listeners.remove(key);
        }
        removed
    }
}

/// Dispatch table keyed by `K`, delivering events of type `E`.
///
/// Cloning is cheap and every clone shares the same table.
pub struct EventDispatcher<K, E> {
    table: Arc<Table<K, E>>,
}

impl<K, E> Clone for EventDispatcher<K, E> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
        }
    }
}

impl<K, E> Default for EventDispatcher<K, E>
where
    K: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, E> EventDispatcher<K, E>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new() -> Self {
        Self {
            table: Arc::new(Table {
                next_id: AtomicU64::new(1),
                listeners: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Register a single-shot listener for `key`.
    ///
    /// The listener is live as soon as this returns; no event dispatched
    /// afterwards can be missed.
    pub fn subscribe(
        &self,
        key: K,
        filter: impl Fn(&E) -> bool + Send + Sync + 'static,
    ) -> Subscription<K, E> {
        let id = self.table.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        {
            let mut listeners = self.table.listeners.lock().unwrap_or_else(|e| e.into_inner());
            listeners.entry(key.clone()).or_default().push(Listener {
                id,
                filter: Box::new(filter),
                tx,
            });
        }
        trace!("Dispatcher: subscribed listener {} on {:?}", id, key);

        Subscription {
            key,
            id,
            rx,
            table: Arc::clone(&self.table),
        }
    }

    /// Hand `event` to the first live listener on `key` that accepts it.
    ///
    /// Returns `true` if a listener consumed the event.
    pub fn dispatch(&self, key: &K, event: E) -> bool {
        let mut listeners = self.table.listeners.lock().unwrap_or_else(|e| e.into_inner());
        let Some(waiting) = listeners.get_mut(key) else {
            return false;
        };
        let Some(index) = waiting.iter().position(|l| (l.filter)(&event)) else {
            return false;
        };

        let listener = waiting.remove(index);
        if waiting.is_empty() {
            listeners.remove(key);
        }
        let delivered = listener.tx.send(event).is_ok();
        debug!(
            "Dispatcher: listener {} on {:?} {}",
            listener.id,
            key,
            if delivered { "resolved" } else { "was gone" }
        );
        delivered
    }

    /// Number of live listeners on `key`.
    pub fn listeners_on(&self, key: &K) -> usize {
        let listeners = self.table.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners.get(key).map_or(0, Vec::len)
    }

    /// Number of live listeners across all keys.
    pub fn len(&self) -> usize {
        let listeners = self.table.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A registered single-shot listener.
///
/// Dropping a subscription deregisters it.
pub struct Subscription<K: Eq + Hash, E> {
    key: K,
    id: u64,
    rx: oneshot::Receiver<E>,
    table: Arc<Table<K, E>>,
}

impl<K: Eq + Hash, E> Subscription<K, E> {
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Remove the listener from the table.
    ///
    /// Returns `false` if it was already gone, meaning an event was
    /// dispatched to it first.
    pub fn deregister(&self) -> bool {
        self.table.remove(&self.key, self.id)
    }

    /// Wait for an event, a timeout or cancellation, whichever comes first.
    pub async fn wait(mut self, timeout: Duration, cancel: &CancellationToken) -> GateOutcome<E> {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => GateOutcome::Cancelled,
            received = tokio::time::timeout(timeout, &mut self.rx) => match received {
                Ok(Ok(event)) => GateOutcome::Responded(event),
                Ok(Err(_)) => GateOutcome::Cancelled,
                Err(_) => GateOutcome::TimedOut,
            },
        };

        if let GateOutcome::TimedOut = outcome
            && !self.deregister()
            && let Ok(event) = self.rx.try_recv()
        {
            // Dispatched between the timer firing and deregistration.
            return GateOutcome::Responded(event);
        }
        outcome
    }
}

impl<K: Eq + Hash, E> Drop for Subscription<K, E> {
    fn drop(&mut self) {
        if self.table.remove(&self.key, self.id) {
            trace!("Dispatcher: dropped listener {}", self.id);
        }
    }
}
