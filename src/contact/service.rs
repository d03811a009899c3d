//! Contact submission pipeline: configuration check, validation, bot
//! check, delivery.

use std::sync::Arc;

use lettre::message::Mailbox;
use tracing::{info, warn};

use super::mailer::{ContactMailer, ResendMailer};
use super::model::{ContactSubmission, OutboundEmail, SUBJECT};
use super::recaptcha::{BotVerifier, RecaptchaVerifier};
use crate::config::ContactConfig;
use crate::error::{ConfigError, ContactError};

pub struct ContactService {
    mailer: Option<Arc<dyn ContactMailer>>,
    inbox: Option<String>,
    from: Mailbox,
    verifier: Option<Arc<dyn BotVerifier>>,
}

impl ContactService {
    pub fn new(
        mailer: Option<Arc<dyn ContactMailer>>,
        inbox: Option<String>,
        from: Mailbox,
        verifier: Option<Arc<dyn BotVerifier>>,
    ) -> Self {
        Self {
            mailer,
            inbox,
            from,
            verifier,
        }
    }

    /// Wire the Resend mailer and reCAPTCHA verifier from configuration.
    ///
    /// Missing keys are not an error here; they surface per request.
    pub fn from_config(config: &ContactConfig) -> Result<Self, ConfigError> {
        let from = config
            .from_address
            .parse::<Mailbox>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "CONTACT_FROM".to_string(),
                message: e.to_string(),
            })?;

        let mailer = config
            .resend_api_key
            .clone()
            .map(|key| Arc::new(ResendMailer::new(key)) as Arc<dyn ContactMailer>);
        let verifier = config
            .recaptcha_secret
            .clone()
            .map(|secret| Arc::new(RecaptchaVerifier::new(secret)) as Arc<dyn BotVerifier>);
        if verifier.is_none() {
            warn!("RECAPTCHA_SECRET_KEY not set, contact form accepts submissions without a bot check");
        }

        Ok(Self::new(mailer, config.contact_email.clone(), from, verifier))
    }

    /// Handle one submission end to end and return the provider payload.
    pub async fn submit(
        &self,
        submission: &ContactSubmission,
    ) -> Result<serde_json::Value, ContactError> {
        let Some(mailer) = &self.mailer else {
            return Err(ContactError::NotConfigured {
                missing: "RESEND_API_KEY".to_string(),
            });
        };

        let reply_to = submission.validate()?;

        if let Some(verifier) = &self.verifier {
            let token = submission.token().ok_or_else(|| ContactError::BotCheckFailed {
                reason: "missing token".to_string(),
            })?;
            verifier.verify(token).await?;
        }

        let Some(inbox) = &self.inbox else {
            return Err(ContactError::NotConfigured {
                missing: "CONTACT_EMAIL".to_string(),
            });
        };

        let email = OutboundEmail {
            from: self.from.to_string(),
            to: vec![inbox.clone()],
            reply_to: reply_to.to_string(),
            subject: SUBJECT.to_string(),
            html: submission.render_html(),
        };
        let data = mailer.send(&email).await?;
        info!(
            interest_area = %submission.interest_area,
            "Contact submission delivered"
        );
        Ok(data)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Records every email instead of sending it.
    #[derive(Default)]
    pub(crate) struct RecordingMailer {
        pub sent: Mutex<Vec<OutboundEmail>>,
        pub fail: bool,
    }

    #[async_trait]
    impl ContactMailer for RecordingMailer {
        async fn send(&self, email: &OutboundEmail) -> Result<serde_json::Value, ContactError> {
            if self.fail {
                return Err(ContactError::Delivery {
                    reason: "stub failure".to_string(),
                });
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(serde_json::json!({"id": "email_123"}))
        }
    }

    /// Accepts exactly one token.
    pub(crate) struct FixedTokenVerifier(pub &'static str);

    #[async_trait]
    impl BotVerifier for FixedTokenVerifier {
        async fn verify(&self, token: &str) -> Result<(), ContactError> {
            if token == self.0 {
                Ok(())
            } else {
                Err(ContactError::BotCheckFailed {
                    reason: "wrong token".to_string(),
                })
            }
        }
    }

    pub(crate) fn from_mailbox() -> Mailbox {
        "Website Contact <onboarding@resend.dev>".parse().unwrap()
    }

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: "Dana".into(),
            email: "dana@example.com".into(),
            message: "Let's talk.".into(),
            interest_area: "Capital raise".into(),
            ..ContactSubmission::default()
        }
    }

    #[tokio::test]
    async fn delivers_to_inbox_with_reply_to() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = ContactService::new(
            Some(mailer.clone()),
            Some("deals@example.com".into()),
            from_mailbox(),
            None,
        );

        let data = service.submit(&submission()).await.unwrap();
        assert_eq!(data["id"], "email_123");

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["deals@example.com".to_string()]);
        assert_eq!(sent[0].reply_to, "dana@example.com");
        assert_eq!(sent[0].subject, SUBJECT);
        assert!(sent[0].from.contains("onboarding@resend.dev"));
        assert!(sent[0].html.contains("Capital raise"));
    }

    #[tokio::test]
    async fn missing_api_key_is_checked_first() {
        let service = ContactService::new(None, None, from_mailbox(), None);
        let err = service
            .submit(&ContactSubmission::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::NotConfigured { ref missing } if missing == "RESEND_API_KEY"));
    }

    #[tokio::test]
    async fn missing_inbox_is_not_configured() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = ContactService::new(Some(mailer.clone()), None, from_mailbox(), None);
        let err = service.submit(&submission()).await.unwrap_err();
        assert!(matches!(err, ContactError::NotConfigured { ref missing } if missing == "CONTACT_EMAIL"));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn verifier_requires_valid_token() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = ContactService::new(
            Some(mailer.clone()),
            Some("deals@example.com".into()),
            from_mailbox(),
            Some(Arc::new(FixedTokenVerifier("good"))),
        );

        let err = service.submit(&submission()).await.unwrap_err();
        assert!(matches!(err, ContactError::BotCheckFailed { .. }));

        let mut with_bad = submission();
        with_bad.recaptcha_token = Some("bad".into());
        assert!(service.submit(&with_bad).await.is_err());

        let mut with_good = submission();
        with_good.recaptcha_token = Some("good".into());
        assert!(service.submit(&with_good).await.is_ok());
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delivery_failure_propagates() {
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..RecordingMailer::default()
        });
        let service = ContactService::new(
            Some(mailer),
            Some("deals@example.com".into()),
            from_mailbox(),
            None,
        );
        let err = service.submit(&submission()).await.unwrap_err();
        assert_eq!(err.public_message(), "Failed to send email");
    }

    #[test]
    fn from_config_rejects_bad_sender() {
        let config = ContactConfig {
            from_address: "not a mailbox".into(),
            ..ContactConfig::default()
        };
        assert!(matches!(
            ContactService::from_config(&config),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
