//! Per-visitor bundle of engagement surfaces driven by page events.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::chat_widget::{CHAT_AUTO_OPEN_AFTER, ChatWidget};
use super::exit_intent::{ExitIntentConfig, ExitIntentDetector, PageSignal, ScrollMetrics};
use super::flags::{EngagementTrigger, SessionFlags, SessionStore, Surface};
use super::sticky_cta::StickyCta;

/// Event reported by the browser.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    PointerLeave {
        y: f64,
    },
    Scroll {
        scroll_top: f64,
        scroll_height: f64,
        viewport_height: f64,
    },
    /// Heartbeat so elapsed timers are evaluated.
    Tick,
    ChatToggled,
    CtaDismissed,
}

/// Surface the browser should reveal now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShowSurface {
    pub surface: Surface,
    pub trigger: EngagementTrigger,
}

/// Result of handling an event.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngagementUpdate {
    pub show: Vec<ShowSurface>,
    pub sticky_cta_visible: bool,
    pub chat_open: bool,
}

/// Timer presets, overridable for tests.
#[derive(Debug, Clone)]
pub struct EngagementTiming {
    pub exit_popup: ExitIntentConfig,
    pub lead_magnet: ExitIntentConfig,
    pub chat_auto_open: Duration,
}

impl Default for EngagementTiming {
    fn default() -> Self {
        Self {
            exit_popup: ExitIntentConfig::exit_popup(),
            lead_magnet: ExitIntentConfig::lead_magnet(),
            chat_auto_open: CHAT_AUTO_OPEN_AFTER,
        }
    }
}

pub struct EngagementTracker {
    flags: Arc<SessionFlags>,
    exit_popup: ExitIntentDetector,
    lead_magnet: ExitIntentDetector,
    sticky_cta: StickyCta,
    chat: ChatWidget,
}

impl EngagementTracker {
    /// Mount every surface for a page view.
    pub fn mount(
        flags: Arc<SessionFlags>,
        timing: EngagementTiming,
        now: Instant,
        initial_scroll: Option<ScrollMetrics>,
    ) -> (Self, EngagementUpdate) {
        let store: Arc<dyn SessionStore> = flags.clone();
        let (exit_popup, exit_signal) =
            ExitIntentDetector::mount(timing.exit_popup, Arc::clone(&store), now, initial_scroll);
        let (lead_magnet, lead_signal) =
            ExitIntentDetector::mount(timing.lead_magnet, Arc::clone(&store), now, initial_scroll);
        let mut sticky_cta = StickyCta::mount(Arc::clone(&store));
        if let Some(metrics) = initial_scroll {
            sticky_cta.on_scroll(metrics.scroll_top);
        }
        let chat = ChatWidget::mount(store, now, timing.chat_auto_open);

        let tracker = Self {
            flags,
            exit_popup,
            lead_magnet,
            sticky_cta,
            chat,
        };

        let mut update = tracker.snapshot();
        if let Some(signal) = exit_signal {
            update.show.push(ShowSurface {
                surface: Surface::ExitPopup,
                trigger: signal.trigger,
            });
        }
        if let Some(signal) = lead_signal {
            update.show.push(ShowSurface {
                surface: Surface::LeadMagnet,
                trigger: signal.trigger,
            });
        }
        (tracker, update)
    }

    pub fn flags(&self) -> &SessionFlags {
        &self.flags
    }

    fn snapshot(&self) -> EngagementUpdate {
        EngagementUpdate {
            show: Vec::new(),
            sticky_cta_visible: self.sticky_cta.is_visible(),
            chat_open: self.chat.is_open(),
        }
    }

    /// Apply one browser event at `now`. Elapsed timers are evaluated on
    /// every event, not only on `Tick`.
    pub fn handle(&mut self, event: PageEvent, now: Instant) -> EngagementUpdate {
        let mut show = Vec::new();

        let signal = match event {
            PageEvent::PointerLeave { y } => Some(PageSignal::PointerLeave { y }),
            PageEvent::Scroll {
                scroll_top,
                scroll_height,
                viewport_height,
            } => {
                self.sticky_cta.on_scroll(scroll_top);
                Some(PageSignal::Scroll(ScrollMetrics {
                    scroll_top,
                    scroll_height,
                    viewport_height,
                }))
            }
            PageEvent::ChatToggled => {
                self.chat.toggle();
                None
            }
            PageEvent::CtaDismissed => {
                self.sticky_cta.dismiss();
                None
            }
            PageEvent::Tick => None,
        };

        for (surface, detector) in [
            (Surface::ExitPopup, &mut self.exit_popup),
            (Surface::LeadMagnet, &mut self.lead_magnet),
        ] {
            let fired = signal
                .and_then(|s| detector.observe(s))
                .or_else(|| detector.poll_timer(now));
            if let Some(fired) = fired {
                show.push(ShowSurface {
                    surface,
                    trigger: fired.trigger,
                });
            }
        }

        if self.chat.poll_auto_open(now) {
            show.push(ShowSurface {
                surface: Surface::ChatWidget,
                trigger: EngagementTrigger::IdleTimeout,
            });
        }

        EngagementUpdate {
            show,
            ..self.snapshot()
        }
    }
}
