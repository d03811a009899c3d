//! REST endpoints for engagement tracking.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use super::exit_intent::ScrollMetrics;
use super::flags::SessionFlags;
use super::tracker::{EngagementTiming, EngagementTracker, PageEvent};
use crate::sessions::SessionRegistry;

/// Shared state for engagement routes.
#[derive(Clone)]
pub struct EngagementRouteState {
    pub sessions: Arc<SessionRegistry<EngagementTracker>>,
    pub timing: EngagementTiming,
}

/// Body of `POST /api/engagement/sessions`.
#[derive(Debug, Deserialize)]
struct MountRequest {
    /// Flags the browser already holds in session storage.
    #[serde(default)]
    flags: Vec<String>,
    #[serde(default)]
    scroll: Option<ScrollMetrics>,
}

fn invalid_session() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": "Invalid session ID"})),
    )
        .into_response()
}

fn unknown_session() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "Session not found"})),
    )
        .into_response()
}

/// POST /api/engagement/sessions
///
/// Mounts the surfaces for a page view and returns the session id plus any
/// surface that should show straight away.
async fn mount(
    State(state): State<EngagementRouteState>,
    Json(request): Json<MountRequest>,
) -> Response {
    let flags = Arc::new(SessionFlags::with_flags(
        request.flags.iter().map(String::as_str),
    ));
    let (tracker, update) = EngagementTracker::mount(
        Arc::clone(&flags),
        state.timing.clone(),
        Instant::now(),
        request.scroll,
    );
    let (id, _) = state.sessions.insert(tracker).await;

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "session_id": id,
            "update": update,
            "flags": flags.snapshot(),
        })),
    )
        .into_response()
}

/// POST /api/engagement/sessions/{id}/events
async fn handle_event(
    State(state): State<EngagementRouteState>,
    Path(id): Path<String>,
    Json(event): Json<PageEvent>,
) -> Response {
    let Ok(id) = Uuid::parse_str(&id) else {
        return invalid_session();
    };
    let Some(session) = state.sessions.get(id).await else {
        return unknown_session();
    };

    let mut tracker = session.lock().await;
    let update = tracker.handle(event, Instant::now());
    Json(serde_json::json!({
        "update": update,
        "flags": tracker.flags().snapshot(),
    }))
    .into_response()
}

/// Build the engagement REST routes.
pub fn engagement_routes(state: EngagementRouteState) -> Router {
    Router::new()
        .route("/api/engagement/sessions", post(mount))
        .route("/api/engagement/sessions/{id}/events", post(handle_event))
        .with_state(state)
}
