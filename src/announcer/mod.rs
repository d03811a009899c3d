//! Live-region announcer — process-wide queue of short status messages
//! delivered to assistive-technology subscribers.
//!
//! Each `announce` call enqueues one message (at the back, or at the front
//! when `priority` is set) and immediately delivers the queue head to every
//! subscriber registered at that moment. Late subscribers get no replay,
//! and a message announced with nobody listening is dequeued and lost.

pub mod ws;

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use tracing::trace;

pub use ws::announcer_routes;

/// Subscriber callback invoked with each delivered message.
pub type Callback = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct Inner {
    queue: VecDeque<String>,
    subscribers: BTreeMap<u64, Callback>,
    next_id: u64,
}

/// Fan-out announcer. Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct Announcer {
    inner: Arc<Mutex<Inner>>,
}

impl Announcer {
    /// Create an independent announcer (the site uses [`global`]).
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue a message and deliver the queue head to current subscribers.
    pub fn announce(&self, message: impl Into<String>, priority: bool) {
        let (head, callbacks) = {
            let mut inner = self.lock();
            let message = message.into();
            if priority {
                inner.queue.push_front(message);
            } else {
                inner.queue.push_back(message);
            }
            let Some(head) = inner.queue.pop_front() else {
                return;
            };
            let callbacks: Vec<Callback> = inner.subscribers.values().cloned().collect();
            (head, callbacks)
        };

        trace!(message = %head, subscribers = callbacks.len(), "Announcing");

        // Callbacks run outside the lock so they may announce or unsubscribe.
        for callback in callbacks {
            callback(&head);
        }
    }

    /// Register a callback. Dropping the returned handle unsubscribes it.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.insert(id, Arc::new(callback));
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Messages still waiting in the queue.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }
}

/// Disposer returned by [`Announcer::subscribe`].
pub struct Subscription {
    id: u64,
    inner: Weak<Mutex<Inner>>,
}

impl Subscription {
    /// Unsubscribe explicitly. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .subscribers
                .remove(&self.id);
        }
    }
}

static GLOBAL: OnceLock<Announcer> = OnceLock::new();

/// The process-wide announcer, constructed on first use.
pub fn global() -> &'static Announcer {
    GLOBAL.get_or_init(Announcer::new)
}

/// Announce on the process-wide announcer.
pub fn announce(message: impl Into<String>, priority: bool) {
    global().announce(message, priority);
}

/// Subscribe to the process-wide announcer.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub fn subscribe<F>(callback: F) -> Subscription
where
    F: Fn(&str) + Send + Sync + 'static,
{
    global().subscribe(callback)
}

/// Live-region text announced when a visitor lands on a page.
pub fn navigation_message(page_title: &str) -> String {
    format!("Navigated to {page_title}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(announcer: &Announcer) -> (Arc<Mutex<Vec<String>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = announcer.subscribe(move |msg| sink.lock().unwrap().push(msg.to_string()));
        (seen, sub)
    }

    #[test]
    fn delivers_in_call_order_exactly_once() {
        let announcer = Announcer::new();
        let (seen, _sub) = recorder(&announcer);

        announcer.announce("A", false);
        announcer.announce("B", false);

        assert_eq!(*seen.lock().unwrap(), vec!["A", "B"]);
        assert_eq!(announcer.pending(), 0);
    }

    #[test]
    fn fans_out_to_every_subscriber() {
        let announcer = Announcer::new();
        let (first, _a) = recorder(&announcer);
        let (second, _b) = recorder(&announcer);

        announcer.announce("Form submitted", false);

        assert_eq!(*first.lock().unwrap(), vec!["Form submitted"]);
        assert_eq!(*second.lock().unwrap(), vec!["Form submitted"]);
    }

    #[test]
    fn no_replay_for_late_subscribers() {
        let announcer = Announcer::new();
        announcer.announce("lost", false);
        assert_eq!(announcer.pending(), 0, "message dequeued even with no listeners");

        let (seen, _sub) = recorder(&announcer);
        announcer.announce("fresh", false);
        assert_eq!(*seen.lock().unwrap(), vec!["fresh"]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let announcer = Announcer::new();
        let (seen, sub) = recorder(&announcer);
        assert_eq!(announcer.subscriber_count(), 1);

        sub.unsubscribe();
        assert_eq!(announcer.subscriber_count(), 0);

        announcer.announce("nobody hears this", false);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn priority_message_is_delivered_immediately() {
        let announcer = Announcer::new();
        let (seen, _sub) = recorder(&announcer);

        announcer.announce("normal", false);
        announcer.announce("urgent", true);

        assert_eq!(*seen.lock().unwrap(), vec!["normal", "urgent"]);
    }

    #[test]
    fn callback_may_announce_reentrantly() {
        let announcer = Announcer::new();
        let echo = announcer.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = announcer.subscribe(move |msg| {
            sink.lock().unwrap().push(msg.to_string());
            if msg == "ping" {
                echo.announce("pong", false);
            }
        });

        announcer.announce("ping", false);
        assert_eq!(*seen.lock().unwrap(), vec!["ping", "pong"]);
    }

    #[test]
    fn global_instance_is_shared() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = subscribe(move |msg| {
            if msg.starts_with("global-test") {
                sink.lock().unwrap().push(msg.to_string());
            }
        });

        announce("global-test 1", false);
        global().announce("global-test 2", false);

        assert_eq!(*seen.lock().unwrap(), vec!["global-test 1", "global-test 2"]);
    }

    #[test]
    fn navigation_message_format() {
        assert_eq!(navigation_message("About Us"), "Navigated to About Us");
    }
}
