use tokio::sync::mpsc;

use super::broadcaster::Hub;

/// A registered subscriber that unsubscribes itself when dropped.
///
/// Streaming handlers hold one of these for the lifetime of a client
/// connection, so a disconnect (which drops the response stream) always
/// releases the registry entry.
pub struct Subscription<E> {
    hub: Hub<E>,
    identity: String,
    generation: u64,
    receiver: mpsc::Receiver<E>,
}

impl<E> Subscription<E> {
    pub(crate) fn new(
        hub: Hub<E>,
        identity: String,
        generation: u64,
        receiver: mpsc::Receiver<E>,
    ) -> Self {
        Self {
            hub,
            identity,
            generation,
            receiver,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Wait for the next event. `None` once the queue is closed and drained.
    pub async fn recv(&mut self) -> Option<E> {
        self.receiver.recv().await
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        self.hub.unsubscribe_generation(&self.identity, self.generation);
    }
}
