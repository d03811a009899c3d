//! Exit-intent detector — decides, once per session, when a retention
//! surface should appear.
//!
//! State machine: `Armed -> Fired`. The first of a pointer leaving through
//! the top edge, a scroll past the depth threshold, or the fallback timer
//! fires the detector. Firing writes the session flag and disarms every
//! source, so later mounts in the same session start suppressed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::flags::{EngagementTrigger, SessionStore, keys};

/// Thresholds for one detector preset.
#[derive(Debug, Clone)]
pub struct ExitIntentConfig {
    /// Pointer Y at or above this (towards the browser chrome) counts as leaving.
    pub top_edge_px: f64,
    /// Fraction of the scrollable range that fires the detector. `None`
    /// disables the scroll trigger.
    pub scroll_fraction: Option<f64>,
    /// Fallback delay after mount.
    pub fallback: Duration,
    /// Session flag written on firing.
    pub session_key: &'static str,
}

impl ExitIntentConfig {
    /// The exit-intent popup: 5 px top edge, 70 % scroll, 45 s fallback.
    pub fn exit_popup() -> Self {
        Self {
            top_edge_px: 5.0,
            scroll_fraction: Some(0.70),
            fallback: Duration::from_secs(45),
            session_key: keys::HAS_SEEN_EXIT_POPUP,
        }
    }

    /// The lead-magnet popup: pointer must reach the very top, no scroll
    /// trigger, 30 s fallback.
    pub fn lead_magnet() -> Self {
        Self {
            top_edge_px: 0.0,
            scroll_fraction: None,
            fallback: Duration::from_secs(30),
            session_key: keys::HAS_SEEN_POPUP,
        }
    }
}

/// Document scroll geometry, as reported by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub viewport_height: f64,
}

impl ScrollMetrics {
    /// Scrolled fraction of the scrollable range, or `None` if the page
    /// cannot scroll.
    pub fn depth(&self) -> Option<f64> {
        let range = self.scroll_height - self.viewport_height;
        if range <= 0.0 {
            return None;
        }
        Some(self.scroll_top / range)
    }
}

/// Input events observed by the detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageSignal {
    /// Pointer left the document at viewport coordinate `y`.
    PointerLeave { y: f64 },
    Scroll(ScrollMetrics),
    /// The fallback timer elapsed.
    TimerElapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorState {
    Armed,
    Fired,
}

/// The single "show" signal a detector emits per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShowSignal {
    pub trigger: EngagementTrigger,
}

/// Exit-intent state machine for one surface.
pub struct ExitIntentDetector {
    config: ExitIntentConfig,
    store: Arc<dyn SessionStore>,
    state: DetectorState,
    /// Fallback deadline; `None` once disarmed.
    deadline: Option<Instant>,
}

impl ExitIntentDetector {
    /// Mount the detector at `now`.
    ///
    /// `initial_scroll` is evaluated immediately so a visitor who landed
    /// past the threshold (anchor link, restored scroll) is not missed.
    pub fn mount(
        config: ExitIntentConfig,
        store: Arc<dyn SessionStore>,
        now: Instant,
        initial_scroll: Option<ScrollMetrics>,
    ) -> (Self, Option<ShowSignal>) {
        let already_seen = store.flag(config.session_key);
        let mut detector = Self {
            deadline: (!already_seen).then(|| now + config.fallback),
            state: if already_seen {
                DetectorState::Fired
            } else {
                DetectorState::Armed
            },
            config,
            store,
        };

        if already_seen {
            debug!(key = detector.config.session_key, "Detector mounted suppressed");
            return (detector, None);
        }

        let signal = initial_scroll.and_then(|m| detector.observe(PageSignal::Scroll(m)));
        (detector, signal)
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == DetectorState::Armed
    }

    /// When the fallback timer elapses, if still armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Feed one event. Returns the show signal on the transition to `Fired`.
    pub fn observe(&mut self, signal: PageSignal) -> Option<ShowSignal> {
        if !self.is_armed() {
            return None;
        }

        let trigger = match signal {
            PageSignal::PointerLeave { y } if y <= self.config.top_edge_px => {
                EngagementTrigger::ExitIntent
            }
            PageSignal::Scroll(metrics) => {
                let threshold = self.config.scroll_fraction?;
                let depth = metrics.depth()?;
                if depth <= threshold {
                    return None;
                }
                EngagementTrigger::ScrollDepthThreshold
            }
            PageSignal::TimerElapsed => EngagementTrigger::IdleTimeout,
            PageSignal::PointerLeave { .. } => return None,
        };

        Some(self.fire(trigger))
    }

    /// Fire the fallback if `now` is past the deadline.
    pub fn poll_timer(&mut self, now: Instant) -> Option<ShowSignal> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.observe(PageSignal::TimerElapsed),
            _ => None,
        }
    }

    fn fire(&mut self, trigger: EngagementTrigger) -> ShowSignal {
        self.state = DetectorState::Fired;
        self.deadline = None;
        self.store.set_flag(self.config.session_key);
        info!(key = self.config.session_key, trigger = ?trigger, "Exit-intent fired");
        ShowSignal { trigger }
    }
}

/// Drive a detector from a stream of page events plus its fallback timer.
///
/// Resolves with the show signal, or `None` when the event channel closes
/// first (surface torn down). Either way the timer and the event
/// subscription are released on return.
pub async fn watch(
    mut detector: ExitIntentDetector,
    mut events: mpsc::Receiver<PageSignal>,
) -> Option<ShowSignal> {
    loop {
        let Some(deadline) = detector.deadline() else {
            return None;
        };

        tokio::select! {
            event = events.recv() => {
                let event = event?;
                if let Some(signal) = detector.observe(event) {
                    return Some(signal);
                }
            }
            _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {
                return detector.observe(PageSignal::TimerElapsed);
            }
        }
    }
}
