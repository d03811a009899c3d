//! Engagement surfaces — exit-intent and lead-magnet popups, sticky CTA,
//! and chat auto-open — each gated by a once-per-session flag.

pub mod chat_widget;
pub mod exit_intent;
pub mod flags;
pub mod routes;
pub mod sticky_cta;
pub mod tracker;

pub use exit_intent::{ExitIntentConfig, ExitIntentDetector, PageSignal, ScrollMetrics, ShowSignal};
pub use flags::{EngagementTrigger, SessionFlags, SessionStore, Surface, keys};
pub use routes::{EngagementRouteState, engagement_routes};
pub use tracker::{EngagementTiming, EngagementTracker, EngagementUpdate, PageEvent};
