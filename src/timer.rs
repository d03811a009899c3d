//! Scoped timers: a spawned delay that is cancelled when its owner drops.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// A background task tied to the lifetime of its owner.
///
/// Dropping the timer aborts the task, so a surface torn down early never
/// sees a callback fire against it.
#[derive(Debug)]
pub struct ScopedTimer {
    handle: JoinHandle<()>,
}

impl ScopedTimer {
    /// Run `task` after `delay` unless the timer is dropped first.
    pub fn after<F>(delay: Duration, task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        Self { handle }
    }

    /// Whether the delayed task has run to completion (or was aborted).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel explicitly. Equivalent to dropping the timer.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
