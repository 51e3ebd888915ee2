//! Scoped event subscriptions
//!
//! A `Subscription` receives every event kind the provider emits. It is
//! registered in one step and unregistered in one step when dropped, so a
//! torn-down session can never observe another event.

use super::events::{CallEvent, VoiceEvent};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: HashMap<u64, mpsc::UnboundedSender<CallEvent>>,
}

/// Fan-out of provider events to live subscriptions
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();

        let id = {
            let mut inner = lock(&self.inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.insert(id, tx);
            id
        };

        debug!("Registered voice event subscription {}", id);

        Subscription {
            id,
            rx,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver an event to every live subscription. Returns the number reached.
    pub fn publish(&self, event: impl Into<CallEvent>) -> usize {
        let event = event.into();
        let mut inner = lock(&self.inner);
        inner
            .subscribers
            .retain(|_, tx| tx.send(event.clone()).is_ok());
        inner.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }
}

/// Handle on a registered set of event handlers
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<CallEvent>,
    bus: Weak<Mutex<BusInner>>,
}

impl Subscription {
    /// Next event, or `None` once the provider is gone
    pub async fn recv(&mut self) -> Option<CallEvent> {
        self.rx.recv().await
    }

    /// Next already-delivered event, without waiting
    pub fn try_recv(&mut self) -> Option<CallEvent> {
        self.rx.try_recv().ok()
    }

    /// Explicit teardown; equivalent to dropping the subscription
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.rx.close();
        if let Some(bus) = self.bus.upgrade() {
            lock(&bus).subscribers.remove(&self.id);
            debug!("Unregistered voice event subscription {}", self.id);
        }
    }
}

fn lock(inner: &Mutex<BusInner>) -> MutexGuard<'_, BusInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
