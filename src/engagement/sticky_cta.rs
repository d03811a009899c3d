//! Sticky call-to-action bar: shown once the visitor scrolls down, hidden
//! for the rest of the session once dismissed.

use std::sync::Arc;

use super::flags::{SessionStore, keys};

/// Vertical scroll offset (px) past which the bar is shown.
pub const STICKY_CTA_SCROLL_PX: f64 = 800.0;

pub struct StickyCta {
    store: Arc<dyn SessionStore>,
    visible: bool,
}

impl StickyCta {
    pub fn mount(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            visible: false,
        }
    }

    pub fn is_dismissed(&self) -> bool {
        self.store.flag(keys::CTA_DISMISSED)
    }

    pub fn is_visible(&self) -> bool {
        self.visible && !self.is_dismissed()
    }

    /// Track the window scroll offset. Returns the new visibility.
    pub fn on_scroll(&mut self, scroll_y: f64) -> bool {
        self.visible = scroll_y > STICKY_CTA_SCROLL_PX && !self.is_dismissed();
        self.visible
    }

    pub fn dismiss(&mut self) {
        self.visible = false;
        self.store.set_flag(keys::CTA_DISMISSED);
    }
}
