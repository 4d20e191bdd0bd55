//! Fan-out of channel events to subscribers (§4.7). Delivery is
//! synchronous, inside the mutation critical section (§5) — subscribers
//! must not call back into the [`crate::manager::Manager`] or they may
//! deadlock on the very channel lock they were notified under.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::channel::Channel;
use crate::event::Event;

pub type Subscriber = Arc<dyn Fn(&Event, &Channel) + Send + Sync>;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct Notifier {
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    next_id: AtomicU64,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, f: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().unwrap().push((id, f));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.lock().unwrap().retain(|(sid, _)| *sid != id);
    }

    /// Invokes every subscriber with `(event, channel)`. A panicking
    /// subscriber is caught and logged rather than poisoning delivery to
    /// the rest — best-effort, per §4.7.
    pub fn publish(&self, event: &Event, channel: &Channel) {
        let subscribers = self.subscribers.lock().unwrap().clone();
        for (id, subscriber) in subscribers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                subscriber(event, channel);
            }));
            if result.is_err() {
                tracing::warn!(subscription = id.0, channel = %channel.id, "subscriber panicked");
            }
        }
    }
}
