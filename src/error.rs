//! Error types for the advisory site service.

use axum::http::StatusCode;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised while handling a contact form submission.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    /// The email service or inbox is not configured on this deployment.
    #[error("Contact service not configured: {missing}")]
    NotConfigured { missing: String },

    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Bot check failed: {reason}")]
    BotCheckFailed { reason: String },

    #[error("Email delivery failed: {reason}")]
    Delivery { reason: String },
}

impl ContactError {
    /// HTTP status reported to the browser for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotConfigured { .. } | Self::Delivery { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation { .. } | Self::BotCheckFailed { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to display to the visitor. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::NotConfigured { missing } if missing == "CONTACT_EMAIL" => {
                "Contact email not configured".to_string()
            }
            Self::NotConfigured { .. } => {
                "Email service not configured. Please contact support.".to_string()
            }
            Self::Validation { field, reason } => format!("Invalid {field}: {reason}"),
            Self::BotCheckFailed { .. } => "reCAPTCHA verification failed".to_string(),
            Self::Delivery { .. } => "Failed to send email".to_string(),
        }
    }
}

/// Client telemetry ingestion errors.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Telemetry not initialized")]
    NotInitialized,

    #[error("Invalid event: {0}")]
    InvalidEvent(String),
}
