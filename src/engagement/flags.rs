//! Per-visitor session flags gating one-time-per-session surfaces.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Session storage keys shared with the browser widgets.
pub mod keys {
    /// The visitor opened or closed the chat widget.
    pub const CHAT_INTERACTED: &str = "chatInteracted";
    /// The exit-intent popup has been shown.
    pub const HAS_SEEN_EXIT_POPUP: &str = "hasSeenExitPopup";
    /// The lead-magnet popup has been shown.
    pub const HAS_SEEN_POPUP: &str = "hasSeenPopup";
    /// The sticky call-to-action bar was dismissed.
    pub const CTA_DISMISSED: &str = "ctaDismissed";
}

/// Value stored for a set flag (boolean-as-string, as in browser storage).
pub const FLAG_SET: &str = "true";

/// Key/value storage scoped to one browser session.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);

    /// Whether a boolean-as-string flag is set.
    fn flag(&self, key: &str) -> bool {
        self.get(key).as_deref() == Some(FLAG_SET)
    }

    fn set_flag(&self, key: &str) {
        self.set(key, FLAG_SET);
    }
}

/// In-memory session store. One per visitor session.
#[derive(Debug, Default)]
pub struct SessionFlags {
    values: Mutex<HashMap<String, String>>,
}

impl SessionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from flags the browser already holds (e.g. after a reload).
    pub fn with_flags<'a>(flags: impl IntoIterator<Item = &'a str>) -> Self {
        let store = Self::new();
        for key in flags {
            store.set_flag(key);
        }
        store
    }

    /// Snapshot of every set flag, for echoing back to the browser.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionStore for SessionFlags {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }
}

/// What caused a surface to be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngagementTrigger {
    IdleTimeout,
    ExitIntent,
    ScrollDepthThreshold,
}

/// An overlay competing for the visitor's attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    ChatWidget,
    ExitPopup,
    LeadMagnet,
    StickyCta,
}

impl Surface {
    /// The session flag owned by this surface.
    pub fn session_key(&self) -> &'static str {
        match self {
            Self::ChatWidget => keys::CHAT_INTERACTED,
            Self::ExitPopup => keys::HAS_SEEN_EXIT_POPUP,
            Self::LeadMagnet => keys::HAS_SEEN_POPUP,
            Self::StickyCta => keys::CTA_DISMISSED,
        }
    }
}
