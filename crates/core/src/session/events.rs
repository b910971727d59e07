use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

/// Notifications a UI needs to mirror session state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// Model loading started (`true`) or finished (`false`).
    LoadingChanged(bool),
    RunningChanged(bool),
    /// The camera could not be opened; carries a user-facing message.
    CameraUnavailable(String),
}

type Subscribers = Mutex<Vec<(u64, Sender<SessionEvent>)>>;

/// Fan-out of [`SessionEvent`]s to any number of subscribers.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Subscribers>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber. Dropping the returned handle unsubscribes.
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, tx));
        Subscription {
            id,
            receiver: rx,
            bus: Arc::downgrade(&self.subscribers),
        }
    }

    pub fn emit(&self, event: SessionEvent) {
        log::debug!("Session event: {event:?}");
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Receiving end of an [`EventBus`] registration.
pub struct Subscription {
    id: u64,
    receiver: Receiver<SessionEvent>,
    bus: Weak<Subscribers>,
}

impl Subscription {
    pub fn try_recv(&self) -> Option<SessionEvent> {
        self.receiver.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<SessionEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// All events queued so far, oldest first.
    pub fn drain(&self) -> Vec<SessionEvent> {
        self.receiver.try_iter().collect()
    }

    pub fn receiver(&self) -> &Receiver<SessionEvent> {
        &self.receiver
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.bus.upgrade() {
            subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}
