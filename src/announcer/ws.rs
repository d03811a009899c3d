//! WebSocket live region + REST publish endpoint for the announcer.

use axum::{
    Json, Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{Announcer, navigation_message};

/// Message from server → live-region client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LiveRegionMessage {
    Announcement { message: String },
}

/// Body of `POST /api/announcements`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnnounceRequest {
    Navigation { page_title: String },
    Message {
        message: String,
        #[serde(default)]
        priority: bool,
    },
}

/// Build the announcer routes around the given instance.
pub fn announcer_routes(announcer: Announcer) -> Router {
    Router::new()
        .route("/ws/announcements", get(ws_handler))
        .route("/api/announcements", post(publish))
        .with_state(announcer)
}

async fn publish(
    State(announcer): State<Announcer>,
    Json(body): Json<AnnounceRequest>,
) -> impl IntoResponse {
    let (message, priority) = match body {
        AnnounceRequest::Navigation { page_title } => (navigation_message(&page_title), false),
        AnnounceRequest::Message { message, priority } => (message, priority),
    };

    if message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Empty announcement"})),
        );
    }

    announcer.announce(message, priority);
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({"status": "announced"})),
    )
}

async fn ws_handler(ws: WebSocketUpgrade, State(announcer): State<Announcer>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, announcer))
}

/// Announcements queued per client before new ones are dropped.
pub const LIVE_REGION_QUEUE: usize = 32;

/// Subscriber callback feeding a bounded queue. A stalled client loses
/// announcements instead of buffering them without limit.
fn enqueue(tx: mpsc::Sender<String>) -> impl Fn(&str) + Send + Sync + 'static {
    move |msg| match tx.try_send(msg.to_string()) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            debug!("Live-region queue full, announcement dropped");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {}
    }
}

async fn handle_socket(socket: WebSocket, announcer: Announcer) {
    let (tx, mut rx) = mpsc::channel::<String>(LIVE_REGION_QUEUE);

    // Held for the life of the connection; dropped on every exit path.
    let subscription = announcer.subscribe(enqueue(tx));
    info!(
        subscribers = announcer.subscriber_count(),
        "Live-region client connected"
    );

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            Some(message) = rx.recv() => {
                let frame = LiveRegionMessage::Announcement { message };
                let Ok(json) = serde_json::to_string(&frame) else {
                    continue;
                };
                if sink.send(Message::Text(json.into())).await.is_err() {
                    debug!("Live-region client disconnected during send");
                    break;
                }
            }

            result = stream.next() => {
                match result {
                    Some(Ok(Message::Ping(data))) => {
                        if sink.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!(error = %e, "Live-region WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    drop(subscription);
    info!("Live-region client disconnected");
}
