//! `POST /api/contact`.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tracing::error;

use super::model::ContactSubmission;
use super::service::ContactService;

/// Shared state for the contact route.
#[derive(Clone)]
pub struct ContactRouteState {
    pub service: Arc<ContactService>,
}

async fn submit(
    State(state): State<ContactRouteState>,
    body: Result<Json<ContactSubmission>, JsonRejection>,
) -> Response {
    let Json(submission) = match body {
        Ok(body) => body,
        Err(rejection) => {
            error!(error = %rejection, "Unreadable contact submission");
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "success": false,
                    "message": "Invalid request body",
                })),
            )
                .into_response();
        }
    };

    match state.service.submit(&submission).await {
        Ok(data) => Json(serde_json::json!({
            "success": true,
            "message": "Email sent successfully",
            "data": data,
        }))
        .into_response(),
        Err(e) => {
            error!(error = %e, "Contact submission failed");
            (
                e.status(),
                Json(serde_json::json!({
                    "success": false,
                    "message": e.public_message(),
                })),
            )
                .into_response()
        }
    }
}

/// Build the contact route.
pub fn contact_routes(state: ContactRouteState) -> Router {
    Router::new()
        .route("/api/contact", post(submit))
        .with_state(state)
}
