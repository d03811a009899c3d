//! Chat widget visibility: visitor toggles plus a one-shot auto-open after
//! an idle period.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use super::flags::{SessionStore, keys};

/// Idle delay before the widget opens on its own.
pub const CHAT_AUTO_OPEN_AFTER: Duration = Duration::from_secs(45);

pub struct ChatWidget {
    store: Arc<dyn SessionStore>,
    open: bool,
    auto_open_at: Option<Instant>,
}

impl ChatWidget {
    pub fn mount(store: Arc<dyn SessionStore>, now: Instant, auto_open_after: Duration) -> Self {
        Self {
            store,
            open: false,
            auto_open_at: Some(now + auto_open_after),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Visitor clicked the toggle. Any interaction cancels auto-open.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.auto_open_at = None;
        self.store.set_flag(keys::CHAT_INTERACTED);
        self.open
    }

    /// Open the widget if the idle deadline passed and the visitor never
    /// interacted. Returns true only on the call that opened it.
    pub fn poll_auto_open(&mut self, now: Instant) -> bool {
        let Some(at) = self.auto_open_at else {
            return false;
        };
        if now < at {
            return false;
        }
        self.auto_open_at = None;
        if self.open || self.store.flag(keys::CHAT_INTERACTED) {
            return false;
        }
        debug!("Auto-opening chat widget");
        self.open = true;
        true
    }
}
