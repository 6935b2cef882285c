//! Snapshot publishing.
//!
//! Every store owns a [`Broadcaster`]. Each subscriber gets its own unbounded
//! channel, so snapshots arrive in the order they were published and a slow
//! reader never blocks a mutation. Dropping the [`Subscription`] is the
//! unsubscribe; the sender is pruned on the next publish.

use tokio::sync::mpsc::{self, error::TryRecvError};

/// Fan-out of snapshots to any number of subscribers.
pub struct Broadcaster<T: Clone> {
    subscribers: Vec<mpsc::UnboundedSender<T>>,
}

impl<T: Clone> Default for Broadcaster<T> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }
}

impl<T: Clone> Broadcaster<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber and hands it `current` right away.
    pub fn subscribe(&mut self, current: T) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        // The receiver is alive, so this cannot fail.
        let _ = tx.send(current);
        self.subscribers.push(tx);
        Subscription { rx }
    }

    /// Sends `snapshot` to every live subscriber and forgets closed ones.
    pub fn publish(&mut self, snapshot: &T) {
        self.subscribers
            .retain(|tx| tx.send(snapshot.clone()).is_ok());
    }

    #[cfg(test)]
    fn subscriber_count(&mut self) -> usize {
        self.subscribers.retain(|tx| !tx.is_closed());
        self.subscribers.len()
    }
}

/// Receiving end of a store subscription.
pub struct Subscription<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    /// Waits for the next snapshot. Returns `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Takes the next pending snapshot without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drains everything pending and returns the most recent snapshot.
    pub fn latest(&mut self) -> Option<T> {
        let mut last = None;
        while let Some(snapshot) = self.try_recv() {
            last = Some(snapshot);
        }
        last
    }
}
