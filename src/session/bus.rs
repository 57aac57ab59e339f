//! Subscriber registry for session events.
//!
//! `subscribe` is the "on" half; dropping the returned [`Subscription`] is the
//! "off" half, so a listener can never be registered without being released.

use super::CallEvent;
use crate::lock_or_recover;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<(u64, Sender<CallEvent>)>,
}

/// Cloneable fan-out point shared by the event feed (publisher) and the UI (subscriber).
#[derive(Clone, Default)]
pub struct SessionEvents {
    registry: Arc<Mutex<Registry>>,
}

/// Live registration on a [`SessionEvents`] bus; unregisters on drop.
pub struct Subscription {
    id: u64,
    rx: Receiver<CallEvent>,
    registry: Arc<Mutex<Registry>>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every event published from now on.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = unbounded();
        let mut registry = lock_or_recover(&self.registry, "session::subscribe");
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.push((id, tx));
        Subscription {
            id,
            rx,
            registry: Arc::clone(&self.registry),
        }
    }

    /// Deliver `event` to every live subscriber; returns how many received it.
    pub fn publish(&self, event: CallEvent) -> usize {
        let mut registry = lock_or_recover(&self.registry, "session::publish");
        registry
            .subscribers
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
        registry.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        lock_or_recover(&self.registry, "session::subscriber_count")
            .subscribers
            .len()
    }
}

impl Subscription {
    /// Next pending event without blocking.
    pub fn try_next(&self) -> Option<CallEvent> {
        self.rx.try_recv().ok()
    }

    /// All pending events, oldest first.
    pub fn drain(&self) -> Vec<CallEvent> {
        self.rx.try_iter().collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut registry = lock_or_recover(&self.registry, "session::unsubscribe");
        registry.subscribers.retain(|(id, _)| *id != self.id);
    }
}
