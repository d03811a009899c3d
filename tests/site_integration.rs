//! Integration tests for the site HTTP + WebSocket surface.
//!
//! Each test spins up the full router on a random port and talks to it
//! over real sockets with reqwest and tokio-tungstenite.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use futures_util::StreamExt;
use secrecy::SecretString;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use advisory_site::announcer::Announcer;
use advisory_site::config::SiteConfig;
use advisory_site::contact::{ContactMailer, ContactService, ResendMailer};
use advisory_site::server::SiteServices;
use advisory_site::telemetry::{Analytics, ErrorMonitor};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

async fn serve(app: Router) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;
    port
}

fn test_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.chat.reply_delay = Duration::from_millis(20);
    config
}

/// Start the site with the default (unconfigured) contact service.
async fn start_site() -> (u16, Announcer) {
    let announcer = Announcer::new();
    let services = SiteServices::new(
        test_config(),
        announcer.clone(),
        Arc::new(ErrorMonitor::new()),
        Arc::new(Analytics::new()),
    )
    .unwrap();
    (serve(services.router()).await, announcer)
}

/// Stand-in for the Resend API. Records the bearer token and payload.
async fn start_resend_stub() -> (u16, Arc<Mutex<Vec<(String, Value)>>>) {
    let seen: Arc<Mutex<Vec<(String, Value)>>> = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);
    let app = Router::new().route(
        "/emails",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let record = Arc::clone(&record);
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                record.lock().unwrap().push((auth, body));
                Json(serde_json::json!({"id": "stub-email-1"}))
            }
        }),
    );
    (serve(app).await, seen)
}

#[tokio::test]
async fn chat_session_round_trip() {
    timeout(TEST_TIMEOUT, async {
        let (port, _) = start_site().await;
        let client = reqwest::Client::new();
        let base = format!("http://127.0.0.1:{port}/api/chat/sessions");

        let created: Value = client.post(&base).send().await.unwrap().json().await.unwrap();
        let id = created["session_id"].as_str().unwrap().to_string();
        assert_eq!(created["transcript"].as_array().unwrap().len(), 1);

        let after_click: Value = client
            .post(format!("{base}/{id}/options"))
            .json(&serde_json::json!({"action": "schedule"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(after_click["transcript"][1]["text"], "Schedule a call");
        assert_eq!(after_click["transcript"].as_array().unwrap().len(), 3);

        let typing: Value = client
            .post(format!("{base}/{id}/messages"))
            .json(&serde_json::json!({"text": "how much is my business worth"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(typing["typing"], true);

        tokio::time::sleep(Duration::from_millis(150)).await;

        let settled: Value = client
            .get(format!("{base}/{id}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(settled["typing"], false);
        let transcript = settled["transcript"].as_array().unwrap();
        assert_eq!(transcript.len(), 5);
        assert!(transcript[4]["text"].as_str().unwrap().starts_with("Valuation"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn scheduling_url_and_sitemap() {
    timeout(TEST_TIMEOUT, async {
        let (port, _) = start_site().await;
        let client = reqwest::Client::new();

        let handoff: Value = client
            .get(format!(
                "http://127.0.0.1:{port}/api/scheduling/url?meeting=strategy&visitor=founder"
            ))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(
            handoff["url"],
            "https://calendly.com/structuredpartners/strategy?utm_source=website&utm_medium=direct&utm_campaign=founder"
        );

        let resp = client
            .get(format!("http://127.0.0.1:{port}/sitemap.xml"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.headers()["content-type"], "application/xml");
        let xml = resp.text().await.unwrap();
        assert!(xml.contains("<loc>https://structuredpartners.com/services/capital-raise</loc>"));
        assert!(xml.contains("/blog/preparing-business-due-diligence</loc>"));
        assert!(xml.contains("/affiliations/national-association-of-manufacturers</loc>"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn engagement_exit_intent_fires_once() {
    timeout(TEST_TIMEOUT, async {
        let (port, _) = start_site().await;
        let client = reqwest::Client::new();
        let base = format!("http://127.0.0.1:{port}/api/engagement/sessions");

        let mounted: Value = client
            .post(&base)
            .json(&serde_json::json!({}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let id = mounted["session_id"].as_str().unwrap().to_string();

        let mut shown = 0;
        for _ in 0..2 {
            let update: Value = client
                .post(format!("{base}/{id}/events"))
                .json(&serde_json::json!({"type": "pointer_leave", "y": 2.0}))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            shown += update["update"]["show"]
                .as_array()
                .unwrap()
                .iter()
                .filter(|s| s["surface"] == "exit_popup")
                .count();
        }
        assert_eq!(shown, 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn announcements_reach_live_region_socket() {
    timeout(TEST_TIMEOUT, async {
        let (port, announcer) = start_site().await;

        let (mut ws, _) = connect_async(format!("ws://127.0.0.1:{port}/ws/announcements"))
            .await
            .unwrap();
        // Let the server register the subscription.
        while announcer.subscriber_count() == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/announcements"))
            .json(&serde_json::json!({"page_title": "About"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 202);

        let frame = loop {
            match ws.next().await.unwrap().unwrap() {
                Message::Text(text) => break text,
                _ => continue,
            }
        };
        let json: Value = serde_json::from_str(frame.as_str()).unwrap();
        assert_eq!(json["type"], "announcement");
        assert_eq!(json["message"], "Navigated to About");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn contact_form_delivers_through_resend_api() {
    timeout(TEST_TIMEOUT, async {
        let (resend_port, seen) = start_resend_stub().await;

        let mailer: Arc<dyn ContactMailer> = Arc::new(
            ResendMailer::new(SecretString::from("re_test_key"))
                .with_endpoint(format!("http://127.0.0.1:{resend_port}/emails")),
        );
        let contact = ContactService::new(
            Some(mailer),
            Some("deals@example.com".to_string()),
            "Website Contact <onboarding@resend.dev>".parse().unwrap(),
            None,
        );
        let services = SiteServices::with_contact(
            test_config(),
            Announcer::new(),
            Arc::new(ErrorMonitor::new()),
            Arc::new(Analytics::new()),
            Arc::new(contact),
        );
        let port = serve(services.router()).await;

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/contact"))
            .json(&serde_json::json!({
                "name": "Dana Founder",
                "email": "dana@example.com",
                "company": "Acme Windows",
                "message": "Exploring a sale in 2025.",
                "interestArea": "Sell-side M&A",
                "bestTimeToCall": "Afternoons"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], "stub-email-1");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (auth, email) = &seen[0];
        assert_eq!(auth, "Bearer re_test_key");
        assert_eq!(email["to"][0], "deals@example.com");
        assert_eq!(email["reply_to"], "dana@example.com");
        assert_eq!(email["subject"], "New Contact Form Submission");
        assert!(email["html"].as_str().unwrap().contains("Acme Windows"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unconfigured_contact_form_is_500() {
    timeout(TEST_TIMEOUT, async {
        let (port, _) = start_site().await;
        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/contact"))
            .json(&serde_json::json!({
                "name": "Dana",
                "email": "dana@example.com",
                "message": "hi"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 500);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], false);
    })
    .await
    .expect("test timed out");
}
