//! Bot check for contact submissions via Google reCAPTCHA.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ContactError;

const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Lowest v3 score accepted as human.
pub const MIN_SCORE: f64 = 0.5;

/// Verifies a client-side bot-check token.
#[async_trait]
pub trait BotVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<(), ContactError>;
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

impl SiteVerifyResponse {
    fn into_result(self) -> Result<(), ContactError> {
        if !self.success {
            return Err(ContactError::BotCheckFailed {
                reason: if self.error_codes.is_empty() {
                    "token rejected".to_string()
                } else {
                    self.error_codes.join(", ")
                },
            });
        }
        match self.score {
            Some(score) if score < MIN_SCORE => Err(ContactError::BotCheckFailed {
                reason: format!("score {score:.2} below {MIN_SCORE}"),
            }),
            _ => Ok(()),
        }
    }
}

/// Google `siteverify` client.
pub struct RecaptchaVerifier {
    secret: SecretString,
    client: reqwest::Client,
}

impl RecaptchaVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl BotVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<(), ContactError> {
        let resp = self
            .client
            .post(SITEVERIFY_URL)
            .form(&[("secret", self.secret.expose_secret()), ("response", token)])
            .send()
            .await
            .map_err(|e| ContactError::BotCheckFailed {
                reason: format!("siteverify unreachable: {e}"),
            })?;

        resp.json::<SiteVerifyResponse>()
            .await
            .map_err(|e| ContactError::BotCheckFailed {
                reason: format!("unreadable siteverify response: {e}"),
            })?
            .into_result()
    }
}
