//! Session registry — in-memory visitor sessions keyed by UUID, pruned
//! when idle.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

struct Entry<T> {
    value: Arc<Mutex<T>>,
    last_seen: Instant,
}

/// Registry of per-visitor session state.
pub struct SessionRegistry<T> {
    name: &'static str,
    sessions: RwLock<HashMap<Uuid, Entry<T>>>,
    idle_timeout: Duration,
}

impl<T: Send + 'static> SessionRegistry<T> {
    /// Create a registry. `name` only labels log lines.
    pub fn new(name: &'static str, idle_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        })
    }

    /// Store a new session and return its id.
    pub async fn insert(&self, value: T) -> (Uuid, Arc<Mutex<T>>) {
        let id = Uuid::new_v4();
        let value = Arc::new(Mutex::new(value));
        self.sessions.write().await.insert(
            id,
            Entry {
                value: Arc::clone(&value),
                last_seen: Instant::now(),
            },
        );
        debug!(registry = self.name, session_id = %id, "Session created");
        (id, value)
    }

    /// Look up a session and mark it as active.
    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<T>>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.value))
    }

    /// Drop sessions idle since before `now - idle_timeout`.
    /// Returns the number of sessions removed.
    pub async fn prune_idle(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_timeout);
        let removed = before - sessions.len();
        if removed > 0 {
            info!(registry = self.name, count = removed, "Pruned idle sessions");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Spawn a background task that periodically prunes idle sessions.
pub fn spawn_prune_task<T: Send + 'static>(
    registry: Arc<SessionRegistry<T>>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            registry.prune_idle(Instant::now()).await;
        }
    })
}
