use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, trace, warn};

use super::events::HubEvent;
use super::subscription::Subscription;

/// Fans events out to a dynamic set of subscribers, each with its own
/// bounded queue.
///
/// Publishing never waits: when a subscriber's queue is full the event is
/// dropped for that subscriber only. Cloning a `Hub` yields another handle to
/// the same registry.
pub struct Hub<E> {
    inner: Arc<Inner<E>>,
}

struct Inner<E> {
    capacity: usize,
    /// identity -> queue
    clients: RwLock<HashMap<String, Client<E>>>,
    next_generation: AtomicU64,
    dropped: AtomicU64,
}

/// A registered queue. `generation` tells apart successive registrations of
/// the same identity.
struct Client<E> {
    tx: mpsc::Sender<E>,
    generation: u64,
}

type Clients<E> = HashMap<String, Client<E>>;

impl<E> Clone for Hub<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Hub<E> {
    /// Create a hub whose subscriber queues hold `capacity` events (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                capacity: capacity.max(1),
                clients: RwLock::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    // Every map update is a single insert/remove, so a poisoned lock still
    // guards a consistent map.
    fn read(&self) -> RwLockReadGuard<'_, Clients<E>> {
        self.inner
            .clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Clients<E>> {
        self.inner
            .clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `identity` and return the receiving end of its queue.
    ///
    /// If the identity is already registered, its previous queue is closed
    /// first so the old reader sees end-of-stream instead of hanging forever.
    pub fn subscribe(&self, identity: impl Into<String>) -> mpsc::Receiver<E> {
        self.register(identity.into()).1
    }

    /// Like [`Hub::subscribe`], but the returned handle unsubscribes itself
    /// when dropped.
    pub fn subscribe_guarded(&self, identity: impl Into<String>) -> Subscription<E> {
        let identity = identity.into();
        let (generation, receiver) = self.register(identity.clone());
        Subscription::new(self.clone(), identity, generation, receiver)
    }

    fn register(&self, identity: String) -> (u64, mpsc::Receiver<E>) {
        let (tx, rx) = mpsc::channel(self.inner.capacity);
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);

        let replaced = self
            .write()
            .insert(identity.clone(), Client { tx, generation });
        if replaced.is_some() {
            warn!(identity = %identity, "identity re-subscribed, previous queue closed");
        } else {
            debug!(identity = %identity, "subscriber registered");
        }
        // `replaced` drops here, closing the orphaned queue.
        (generation, rx)
    }

    /// Close and remove the queue of `identity`. Unknown identities are ignored.
    pub fn unsubscribe(&self, identity: &str) {
        let removed = self.write().remove(identity);
        match removed {
            Some(_) => debug!(identity = %identity, "subscriber removed"),
            None => trace!(identity = %identity, "unsubscribe for unknown identity"),
        }
    }

    /// Remove `identity` only if it is still the registration `generation`.
    /// A guard outliving a re-subscription must not tear down the newer queue.
    pub(crate) fn unsubscribe_generation(&self, identity: &str, generation: u64) {
        let mut clients = self.write();
        if clients
            .get(identity)
            .is_some_and(|client| client.generation == generation)
        {
            clients.remove(identity);
            debug!(identity = %identity, "subscriber removed");
        }
    }

    /// Number of registered subscribers
    pub fn client_count(&self) -> usize {
        self.read().len()
    }

    /// Queue capacity per subscriber
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Total events discarded because a subscriber's queue was full
    pub fn dropped_count(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }
}

impl<E: Clone> Hub<E> {
    /// Offer `event` to every registered subscriber without waiting.
    pub fn publish(&self, event: E) {
        let clients = self.read();

        for (identity, client) in clients.iter() {
            match client.tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    self.inner.dropped.fetch_add(1, Ordering::Relaxed);
                    debug!(identity = %identity, "subscriber queue full, event dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    // Reader went away without unsubscribing; the entry stays
                    // until it does.
                    trace!(identity = %identity, "subscriber queue closed by reader");
                }
            }
        }
    }
}

impl<E: HubEvent> Hub<E> {
    /// A hub sized for the event kind.
    pub fn for_kind() -> Self {
        Self::new(E::CAPACITY)
    }
}

impl<E: HubEvent> Default for Hub<E> {
    fn default() -> Self {
        Self::for_kind()
    }
}
