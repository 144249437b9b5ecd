//! Scroll event delivery from a container to its listeners.
//!
//! A [`ScrollSubscription`] owns the receiving end of a channel. Dropping it
//! is the unsubscribe: the emitter notices the closed channel and prunes the
//! listener on its next emit, so there is no separate removal call to forget.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::time::Instant;

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one scroll container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(u64);

impl ContainerId {
    pub fn next() -> Self {
        Self(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollEvent {
    pub container: ContainerId,
    pub at: Instant,
}

/// Source of scroll events, owned by the scroll container.
#[derive(Debug)]
pub struct ScrollEmitter {
    id: ContainerId,
    listeners: Vec<mpsc::UnboundedSender<ScrollEvent>>,
}

impl Default for ScrollEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollEmitter {
    pub fn new() -> Self {
        Self {
            id: ContainerId::next(),
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> ScrollSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.push(tx);
        tracing::trace!(container = ?self.id, "Scroll listener subscribed");
        ScrollSubscription {
            container: self.id,
            rx,
        }
    }

    /// Notify live listeners. Returns how many received the event.
    pub fn emit(&mut self, at: Instant) -> usize {
        let event = ScrollEvent {
            container: self.id,
            at,
        };
        self.listeners.retain(|tx| tx.send(event).is_ok());
        self.listeners.len()
    }

    /// Live listeners, after pruning dropped subscriptions.
    pub fn listener_count(&mut self) -> usize {
        self.listeners.retain(|tx| !tx.is_closed());
        self.listeners.len()
    }
}

/// Receiving end of a [`ScrollEmitter`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct ScrollSubscription {
    container: ContainerId,
    rx: mpsc::UnboundedReceiver<ScrollEvent>,
}

impl ScrollSubscription {
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// Next queued event, without waiting.
    pub fn try_next(&mut self) -> Option<ScrollEvent> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_reach_subscriber() {
        let mut emitter = ScrollEmitter::new();
        let mut sub = emitter.subscribe();
        let t0 = Instant::now();

        assert_eq!(emitter.emit(t0), 1);
        let event = sub.try_next().expect("event delivered");
        assert_eq!(event.container, sub.container());
        assert_eq!(event.at, t0);
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let mut emitter = ScrollEmitter::new();
        let sub = emitter.subscribe();
        let _other = emitter.subscribe();
        assert_eq!(emitter.listener_count(), 2);

        drop(sub);
        assert_eq!(emitter.listener_count(), 1);
        assert_eq!(emitter.emit(Instant::now()), 1);
    }

    #[test]
    fn test_container_ids_are_unique() {
        let mut a = ScrollEmitter::new();
        let mut b = ScrollEmitter::new();
        assert_ne!(a.subscribe().container(), b.subscribe().container());
    }
}
