//! Email delivery for contact submissions.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::model::OutboundEmail;
use crate::error::ContactError;

const RESEND_EMAILS_URL: &str = "https://api.resend.com/emails";

/// Delivers a rendered notification email.
///
/// Returns the provider's response payload, which is echoed to the browser
/// as `data`.
#[async_trait]
pub trait ContactMailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<serde_json::Value, ContactError>;
}

/// Resend transactional email API.
pub struct ResendMailer {
    api_key: SecretString,
    endpoint: String,
    client: reqwest::Client,
}

impl ResendMailer {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            endpoint: RESEND_EMAILS_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point at a different endpoint (used against local stubs).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl ContactMailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<serde_json::Value, ContactError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(email)
            .send()
            .await
            .map_err(|e| ContactError::Delivery {
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ContactError::Delivery {
                reason: format!("resend returned {status}: {body}"),
            });
        }

        let data = resp
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ContactError::Delivery {
                reason: format!("unreadable resend response: {e}"),
            })?;
        debug!(id = %data["id"], "Resend accepted email");
        Ok(data)
    }
}
