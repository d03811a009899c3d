//! Bounded event buffer shared by the error monitor and analytics.

use std::collections::VecDeque;

use tokio::sync::{Mutex, Notify};

struct Inner<T> {
    events: VecDeque<T>,
    overflowed: u64,
}

/// A drained batch.
#[derive(Debug)]
pub struct Batch<T> {
    pub events: Vec<T>,
    /// Events discarded since the previous drain because the buffer was full.
    pub overflowed: u64,
}

/// FIFO buffer that keeps the newest `capacity` events and asks for an
/// early flush once `flush_at` events are waiting.
pub struct EventBuffer<T> {
    inner: Mutex<Inner<T>>,
    capacity: usize,
    flush_at: usize,
    flush_now: Notify,
}

impl<T> EventBuffer<T> {
    pub fn new(capacity: usize, flush_at: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                events: VecDeque::new(),
                overflowed: 0,
            }),
            capacity,
            flush_at,
            flush_now: Notify::new(),
        }
    }

    pub async fn push(&self, event: T) {
        let mut inner = self.inner.lock().await;
        if inner.events.len() >= self.capacity {
            inner.events.pop_front();
            inner.overflowed += 1;
        }
        inner.events.push_back(event);
        if inner.events.len() >= self.flush_at {
            self.flush_now.notify_one();
        }
    }

    /// Take everything buffered.
    pub async fn drain(&self) -> Batch<T> {
        let mut inner = self.inner.lock().await;
        Batch {
            events: inner.events.drain(..).collect(),
            overflowed: std::mem::take(&mut inner.overflowed),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.events.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Resolves when the buffer has reached its early-flush threshold.
    pub async fn flush_requested(&self) {
        self.flush_now.notified().await;
    }
}
