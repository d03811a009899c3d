//! Ingestion endpoints for browser telemetry.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use super::{Analytics, AnalyticsEvent, ClientError, ErrorMonitor};
use crate::error::TelemetryError;

/// Shared state for telemetry routes.
#[derive(Clone)]
pub struct TelemetryRouteState {
    pub errors: Arc<ErrorMonitor>,
    pub analytics: Arc<Analytics>,
}

/// A single event or a batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(events) => events,
            OneOrMany::One(event) => vec![event],
        }
    }
}

fn rejected(err: TelemetryError) -> Response {
    let status = match err {
        TelemetryError::NotInitialized => StatusCode::SERVICE_UNAVAILABLE,
        TelemetryError::InvalidEvent(_) => StatusCode::BAD_REQUEST,
    };
    (status, Json(serde_json::json!({"error": err.to_string()}))).into_response()
}

fn accepted(count: usize) -> Response {
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({"accepted": count})),
    )
        .into_response()
}

/// POST /api/errors
async fn report_errors(
    State(state): State<TelemetryRouteState>,
    body: Result<Json<OneOrMany<ClientError>>, JsonRejection>,
) -> Response {
    let events = match body {
        Ok(Json(events)) => events.into_vec(),
        Err(e) => return rejected(TelemetryError::InvalidEvent(e.body_text())),
    };
    let mut count = 0;
    for event in events {
        if let Err(e) = state.errors.capture(event).await {
            return rejected(e);
        }
        count += 1;
    }
    accepted(count)
}

/// POST /api/analytics/events
async fn track_events(
    State(state): State<TelemetryRouteState>,
    body: Result<Json<OneOrMany<AnalyticsEvent>>, JsonRejection>,
) -> Response {
    let events = match body {
        Ok(Json(events)) => events.into_vec(),
        Err(e) => return rejected(TelemetryError::InvalidEvent(e.body_text())),
    };
    let mut count = 0;
    for event in events {
        if let Err(e) = state.analytics.track(event).await {
            return rejected(e);
        }
        count += 1;
    }
    accepted(count)
}

/// Build the telemetry ingestion routes.
pub fn telemetry_routes(state: TelemetryRouteState) -> Router {
    Router::new()
        .route("/api/errors", post(report_errors))
        .route("/api/analytics/events", post(track_events))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn state() -> TelemetryRouteState {
        TelemetryRouteState {
            errors: Arc::new(ErrorMonitor::new()),
            analytics: Arc::new(Analytics::new()),
        }
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn single_and_batched_errors() {
        let state = state();
        let app = telemetry_routes(state.clone());

        let resp = app
            .clone()
            .oneshot(post_json(
                "/api/errors",
                serde_json::json!({"message": "boom", "source": "app.js", "lineno": 3}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);

        let resp = app
            .oneshot(post_json(
                "/api/errors",
                serde_json::json!([{"message": "a"}, {"message": "b"}]),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(state.errors.pending().await, 3);
    }

    #[tokio::test]
    async fn malformed_error_report_is_400() {
        let app = telemetry_routes(state());
        let resp = app
            .oneshot(post_json("/api/errors", serde_json::json!({"source": "x"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analytics_events_are_buffered() {
        let state = state();
        let app = telemetry_routes(state.clone());
        let resp = app
            .oneshot(post_json(
                "/api/analytics/events",
                serde_json::json!({"type": "page_view", "page": "/about"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(state.analytics.pending().await, 1);
    }

    #[tokio::test]
    async fn unknown_analytics_type_is_400() {
        let app = telemetry_routes(state());
        let resp = app
            .oneshot(post_json(
                "/api/analytics/events",
                serde_json::json!({"type": "scroll_party"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
