//! Contact form submission and the email rendered from it.

use lettre::Address;
use serde::{Deserialize, Serialize};

use crate::error::ContactError;
use crate::markup::escape;

/// Subject line of every delivered submission.
pub const SUBJECT: &str = "New Contact Form Submission";

/// Body of `POST /api/contact`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub interest_area: String,
    #[serde(default)]
    pub best_time_to_call: String,
    #[serde(default)]
    pub recaptcha_token: Option<String>,
}

fn required(field: &str, value: &str) -> Result<(), ContactError> {
    if value.trim().is_empty() {
        return Err(ContactError::Validation {
            field: field.to_string(),
            reason: "is required".to_string(),
        });
    }
    Ok(())
}

impl ContactSubmission {
    /// Check required fields and return the parsed reply-to address.
    pub fn validate(&self) -> Result<Address, ContactError> {
        required("name", &self.name)?;
        required("email", &self.email)?;
        required("message", &self.message)?;
        self.email
            .trim()
            .parse::<Address>()
            .map_err(|e| ContactError::Validation {
                field: "email".to_string(),
                reason: e.to_string(),
            })
    }

    /// The bot-check token, if one was sent and is non-blank.
    pub fn token(&self) -> Option<&str> {
        self.recaptcha_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// HTML body of the notification email. Visitor input is escaped.
    pub fn render_html(&self) -> String {
        format!(
            "<h2>New Contact Form Submission</h2>\n\
             <p><strong>Name:</strong> {}</p>\n\
             <p><strong>Email:</strong> {}</p>\n\
             <p><strong>Company:</strong> {}</p>\n\
             <p><strong>Phone:</strong> {}</p>\n\
             <p><strong>Interest Area:</strong> {}</p>\n\
             <p><strong>Best Time To Call:</strong> {}</p>\n\
             <p><strong>Message:</strong><br/>{}</p>\n",
            escape(self.name.trim()),
            escape(self.email.trim()),
            escape(&self.company),
            escape(&self.phone),
            escape(&self.interest_area),
            escape(&self.best_time_to_call),
            escape(&self.message).replace('\n', "<br/>"),
        )
    }
}

/// A notification email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
}
