//! Client telemetry — browser error reports and analytics events,
//! buffered and flushed to the log in batches.
//!
//! One process-wide [`Telemetry`] owns both collectors and their flush
//! tasks. [`init`] starts it, [`shutdown`] flushes what is left and stops
//! the tasks.

pub mod buffer;
pub mod routes;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use self::buffer::EventBuffer;
use crate::error::TelemetryError;

pub use routes::{TelemetryRouteState, telemetry_routes};

/// Events held per collector before the oldest are discarded.
pub const BUFFER_CAPACITY: usize = 1000;
pub const ERROR_FLUSH_INTERVAL: Duration = Duration::from_secs(10);
pub const ANALYTICS_FLUSH_INTERVAL: Duration = Duration::from_secs(30);

/// An uncaught exception or unhandled rejection reported by a browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientError {
    pub message: String,
    #[serde(default = "unknown_source")]
    pub source: String,
    #[serde(default)]
    pub lineno: Option<u32>,
    #[serde(default)]
    pub colno: Option<u32>,
    #[serde(default)]
    pub stack: Option<String>,
    #[serde(default)]
    pub component_stack: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

fn unknown_source() -> String {
    "unknown".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsEventType {
    PageView,
    Click,
    FormSubmit,
    CtaClick,
    ChatOpen,
    Download,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    #[serde(rename = "type")]
    pub kind: AnalyticsEventType,
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Collects client errors; flushed every [`ERROR_FLUSH_INTERVAL`] or once
/// five are waiting.
pub struct ErrorMonitor {
    buffer: EventBuffer<ClientError>,
    active: AtomicBool,
}

impl ErrorMonitor {
    pub fn new() -> Self {
        Self {
            buffer: EventBuffer::new(BUFFER_CAPACITY, 5),
            active: AtomicBool::new(true),
        }
    }

    /// Buffer a client error. The server timestamp fills in a missing one.
    pub async fn capture(&self, mut event: ClientError) -> Result<(), TelemetryError> {
        if !self.active.load(Ordering::Acquire) {
            return Err(TelemetryError::NotInitialized);
        }
        if event.message.trim().is_empty() {
            return Err(TelemetryError::InvalidEvent("message is required".into()));
        }
        event.timestamp.get_or_insert_with(Utc::now);
        debug!(source = %event.source, "Client error captured");
        self.buffer.push(event).await;
        Ok(())
    }

    /// Log everything buffered. Returns the number of events written.
    pub async fn flush(&self) -> usize {
        let batch = self.buffer.drain().await;
        if batch.overflowed > 0 {
            warn!(
                dropped = batch.overflowed,
                "Client error buffer overflowed, oldest reports discarded"
            );
        }
        for event in &batch.events {
            error!(
                source = %event.source,
                url = %event.url,
                lineno = ?event.lineno,
                colno = ?event.colno,
                user_agent = %event.user_agent,
                timestamp = ?event.timestamp,
                stack = ?event.stack,
                component_stack = ?event.component_stack,
                "Client error: {}",
                event.message
            );
        }
        batch.events.len()
    }

    pub async fn pending(&self) -> usize {
        self.buffer.len().await
    }
}

impl Default for ErrorMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects analytics events; flushed every [`ANALYTICS_FLUSH_INTERVAL`]
/// or once ten are waiting.
pub struct Analytics {
    buffer: EventBuffer<AnalyticsEvent>,
    active: AtomicBool,
}

impl Analytics {
    pub fn new() -> Self {
        Self {
            buffer: EventBuffer::new(BUFFER_CAPACITY, 10),
            active: AtomicBool::new(true),
        }
    }

    pub async fn track(&self, mut event: AnalyticsEvent) -> Result<(), TelemetryError> {
        if !self.active.load(Ordering::Acquire) {
            return Err(TelemetryError::NotInitialized);
        }
        event.timestamp.get_or_insert_with(Utc::now);
        self.buffer.push(event).await;
        Ok(())
    }

    /// Log a per-type summary of everything buffered.
    pub async fn flush(&self) -> usize {
        let batch = self.buffer.drain().await;
        if batch.overflowed > 0 {
            warn!(
                dropped = batch.overflowed,
                "Analytics buffer overflowed, oldest events discarded"
            );
        }
        if batch.events.is_empty() {
            return 0;
        }

        let mut by_kind: BTreeMap<AnalyticsEventType, usize> = BTreeMap::new();
        for event in &batch.events {
            *by_kind.entry(event.kind).or_default() += 1;
            debug!(kind = ?event.kind, page = %event.page, "Analytics event");
        }
        info!(count = batch.events.len(), by_kind = ?by_kind, "Analytics batch");
        batch.events.len()
    }

    pub async fn pending(&self) -> usize {
        self.buffer.len().await
    }
}

impl Default for Analytics {
    fn default() -> Self {
        Self::new()
    }
}

/// A buffered collector the flush task can drain.
#[async_trait]
pub trait Collector: Send + Sync + 'static {
    /// Resolves once the buffer asks for an early flush.
    async fn flush_requested(&self);

    /// Write out everything buffered. Returns the number of events written.
    async fn flush_batch(&self) -> usize;
}

#[async_trait]
impl Collector for ErrorMonitor {
    async fn flush_requested(&self) {
        self.buffer.flush_requested().await
    }

    async fn flush_batch(&self) -> usize {
        self.flush().await
    }
}

#[async_trait]
impl Collector for Analytics {
    async fn flush_requested(&self) {
        self.buffer.flush_requested().await
    }

    async fn flush_batch(&self) -> usize {
        self.flush().await
    }
}

/// Flush `collector` on every interval tick and whenever it fills up early.
pub fn spawn_flush_task<C: Collector>(collector: Arc<C>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = collector.flush_requested() => {}
            }
            collector.flush_batch().await;
        }
    })
}

/// Process-wide telemetry collectors and their flush tasks.
pub struct Telemetry {
    pub errors: Arc<ErrorMonitor>,
    pub analytics: Arc<Analytics>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

static TELEMETRY: OnceLock<Telemetry> = OnceLock::new();

/// Start telemetry. Idempotent: later calls return the running instance.
///
/// Must be called from within a Tokio runtime.
pub fn init() -> &'static Telemetry {
    TELEMETRY.get_or_init(|| {
        let errors = Arc::new(ErrorMonitor::new());
        let analytics = Arc::new(Analytics::new());
        let tasks = vec![
            spawn_flush_task(Arc::clone(&errors), ERROR_FLUSH_INTERVAL),
            spawn_flush_task(Arc::clone(&analytics), ANALYTICS_FLUSH_INTERVAL),
        ];
        info!("Telemetry collectors started");
        Telemetry {
            errors,
            analytics,
            tasks: Mutex::new(tasks),
        }
    })
}

/// The running instance, if [`init`] has been called.
pub fn get() -> Result<&'static Telemetry, TelemetryError> {
    TELEMETRY.get().ok_or(TelemetryError::NotInitialized)
}

/// Stop the flush tasks and write out whatever is still buffered.
/// Captures after shutdown are refused.
pub async fn shutdown() {
    let Some(telemetry) = TELEMETRY.get() else {
        return;
    };
    telemetry.errors.active.store(false, Ordering::Release);
    telemetry.analytics.active.store(false, Ordering::Release);

    let tasks = match telemetry.tasks.lock() {
        Ok(mut tasks) => std::mem::take(&mut *tasks),
        Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
    };
    for task in tasks {
        task.abort();
    }

    let errors = telemetry.errors.flush().await;
    let events = telemetry.analytics.flush().await;
    info!(errors, events, "Telemetry flushed on shutdown");
}
