//! REST endpoints for the chat assistant.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::engine::{self, ChatSession, ConversationSettings, Effect};
use crate::sessions::SessionRegistry;

/// Shared state for chat routes.
#[derive(Clone)]
pub struct ChatRouteState {
    pub sessions: Arc<SessionRegistry<ChatSession>>,
    pub settings: ConversationSettings,
}

#[derive(Debug, Deserialize)]
struct OptionRequest {
    action: String,
}

#[derive(Debug, Deserialize)]
struct MessageRequest {
    text: String,
}

fn snapshot(id: Uuid, session: &ChatSession, effects: &[Effect]) -> serde_json::Value {
    let conversation = session.conversation();
    serde_json::json!({
        "session_id": id,
        "transcript": conversation.transcript(),
        "typing": conversation.is_typing(),
        "effects": effects,
    })
}

async fn lookup(
    state: &ChatRouteState,
    id: &str,
) -> Result<(Uuid, Arc<Mutex<ChatSession>>), Response> {
    let id = Uuid::parse_str(id).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Invalid session ID"})),
        )
            .into_response()
    })?;
    match state.sessions.get(id).await {
        Some(session) => Ok((id, session)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Session not found"})),
        )
            .into_response()),
    }
}

/// POST /api/chat/sessions
///
/// Starts a conversation. The transcript holds the greeting menu.
async fn create_session(State(state): State<ChatRouteState>) -> Response {
    let (id, session) = state
        .sessions
        .insert(ChatSession::new(state.settings.clone()))
        .await;
    let session = session.lock().await;
    (StatusCode::CREATED, Json(snapshot(id, &session, &[]))).into_response()
}

/// GET /api/chat/sessions/{id}
///
/// Polled by the widget while `typing` is true.
async fn get_session(State(state): State<ChatRouteState>, Path(id): Path<String>) -> Response {
    match lookup(&state, &id).await {
        Ok((id, session)) => {
            let session = session.lock().await;
            Json(snapshot(id, &session, &[])).into_response()
        }
        Err(resp) => resp,
    }
}

/// POST /api/chat/sessions/{id}/options
async fn select_option(
    State(state): State<ChatRouteState>,
    Path(id): Path<String>,
    Json(request): Json<OptionRequest>,
) -> Response {
    let (id, session) = match lookup(&state, &id).await {
        Ok(found) => found,
        Err(resp) => return resp,
    };
    let mut session = session.lock().await;
    let effects = session.select_option(&request.action);
    Json(snapshot(id, &session, &effects)).into_response()
}

/// POST /api/chat/sessions/{id}/messages
///
/// Blank text is accepted and ignored.
async fn submit_message(
    State(state): State<ChatRouteState>,
    Path(id): Path<String>,
    Json(request): Json<MessageRequest>,
) -> Response {
    let (id, session) = match lookup(&state, &id).await {
        Ok(found) => found,
        Err(resp) => return resp,
    };
    engine::submit_free_text(&session, &request.text).await;
    let session = session.lock().await;
    Json(snapshot(id, &session, &[])).into_response()
}

/// Build the chat REST routes.
pub fn chat_routes(state: ChatRouteState) -> Router {
    Router::new()
        .route("/api/chat/sessions", post(create_session))
        .route("/api/chat/sessions/{id}", get(get_session))
        .route("/api/chat/sessions/{id}/options", post(select_option))
        .route("/api/chat/sessions/{id}/messages", post(submit_message))
        .with_state(state)
}
