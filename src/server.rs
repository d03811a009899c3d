//! HTTP surface — composes every module's routes into one router.

use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::Method;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

use crate::announcer::{Announcer, announcer_routes};
use crate::chat::{ChatRouteState, ChatSession, ConversationSettings, chat_routes};
use crate::config::SiteConfig;
use crate::contact::{ContactRouteState, ContactService, contact_routes};
use crate::engagement::routes::{EngagementRouteState, engagement_routes};
use crate::engagement::tracker::{EngagementTiming, EngagementTracker};
use crate::error::ConfigError;
use crate::scheduling::{SchedulingRouteState, scheduling_routes};
use crate::sessions::{SessionRegistry, spawn_prune_task};
use crate::sitemap::{SitemapRouteState, sitemap_routes};
use crate::telemetry::{Analytics, ErrorMonitor, TelemetryRouteState, telemetry_routes};

/// How often idle sessions are swept.
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Everything the routes share.
pub struct SiteServices {
    pub config: SiteConfig,
    pub announcer: Announcer,
    pub chat_sessions: Arc<SessionRegistry<ChatSession>>,
    pub engagement_sessions: Arc<SessionRegistry<EngagementTracker>>,
    pub contact: Arc<ContactService>,
    pub errors: Arc<ErrorMonitor>,
    pub analytics: Arc<Analytics>,
}

impl SiteServices {
    /// Build services from configuration with the given announcer and
    /// telemetry collectors.
    pub fn new(
        config: SiteConfig,
        announcer: Announcer,
        errors: Arc<ErrorMonitor>,
        analytics: Arc<Analytics>,
    ) -> Result<Self, ConfigError> {
        let contact = Arc::new(ContactService::from_config(&config.contact)?);
        Ok(Self::with_contact(config, announcer, errors, analytics, contact))
    }

    /// Like [`Self::new`] with a pre-built contact service.
    pub fn with_contact(
        config: SiteConfig,
        announcer: Announcer,
        errors: Arc<ErrorMonitor>,
        analytics: Arc<Analytics>,
        contact: Arc<ContactService>,
    ) -> Self {
        let idle = config.chat.session_idle_timeout;
        Self {
            chat_sessions: SessionRegistry::new("chat", idle),
            engagement_sessions: SessionRegistry::new("engagement", idle),
            config,
            announcer,
            contact,
            errors,
            analytics,
        }
    }

    /// Start the idle-session sweeps.
    pub fn spawn_background_tasks(&self) -> Vec<JoinHandle<()>> {
        vec![
            spawn_prune_task(Arc::clone(&self.chat_sessions), PRUNE_INTERVAL),
            spawn_prune_task(Arc::clone(&self.engagement_sessions), PRUNE_INTERVAL),
        ]
    }

    /// The full application router.
    pub fn router(&self) -> Router {
        let chat = chat_routes(ChatRouteState {
            sessions: Arc::clone(&self.chat_sessions),
            settings: ConversationSettings {
                reply_delay: self.config.chat.reply_delay,
                ..ConversationSettings::default()
            },
        });
        let engagement = engagement_routes(EngagementRouteState {
            sessions: Arc::clone(&self.engagement_sessions),
            timing: EngagementTiming::default(),
        });
        let scheduling = scheduling_routes(SchedulingRouteState {
            base_url: self.config.calendly_base_url.clone(),
        });
        let contact = contact_routes(ContactRouteState {
            service: Arc::clone(&self.contact),
        });
        let sitemap = sitemap_routes(SitemapRouteState {
            base_url: self.config.base_url.clone(),
        });
        let telemetry = telemetry_routes(TelemetryRouteState {
            errors: Arc::clone(&self.errors),
            analytics: Arc::clone(&self.analytics),
        });

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE, ACCEPT]);

        Router::new()
            .route("/health", get(health))
            .merge(announcer_routes(self.announcer.clone()))
            .merge(chat)
            .merge(engagement)
            .merge(scheduling)
            .merge(contact)
            .merge(sitemap)
            .merge(telemetry)
            .layer(cors)
    }
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "advisory-site",
    }))
}
