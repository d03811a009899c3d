//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default public origin used for sitemap URLs.
pub const DEFAULT_SITE_BASE_URL: &str = "https://structuredpartners.com";
/// Default Calendly account URL.
pub const DEFAULT_CALENDLY_BASE_URL: &str = "https://calendly.com/structuredpartners";

/// Site service configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Public origin of the website, without a trailing slash.
    pub base_url: String,
    /// HTTP listen port.
    pub port: u16,
    /// Contact form delivery settings.
    pub contact: ContactConfig,
    /// Calendly account URL the scheduling router builds on.
    pub calendly_base_url: String,
    /// Chat assistant settings.
    pub chat: ChatConfig,
}

/// Contact form delivery settings.
///
/// Every field is optional at startup; the contact route reports a
/// configuration error per request instead of refusing to boot.
#[derive(Debug, Clone, Default)]
pub struct ContactConfig {
    /// Resend API key.
    pub resend_api_key: Option<SecretString>,
    /// Inbox that receives submissions.
    pub contact_email: Option<String>,
    /// Sender mailbox shown on delivered submissions.
    pub from_address: String,
    /// When set, every submission must carry a valid reCAPTCHA token.
    pub recaptcha_secret: Option<SecretString>,
}

/// Chat assistant settings.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Simulated "thinking" delay before a free-text reply lands.
    pub reply_delay: Duration,
    /// Chat sessions untouched for this long are pruned.
    pub session_idle_timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(1000),
            session_idle_timeout: Duration::from_secs(30 * 60),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SITE_BASE_URL.to_string(),
            port: 8080,
            contact: ContactConfig {
                from_address: default_from_address(),
                ..ContactConfig::default()
            },
            calendly_base_url: DEFAULT_CALENDLY_BASE_URL.to_string(),
            chat: ChatConfig::default(),
        }
    }
}

fn default_from_address() -> String {
    "Website Contact <onboarding@resend.dev>".to_string()
}

/// Read an env var, treating empty values as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    parse_setting(key, env_opt(key), default)
}

fn parse_setting<T: std::str::FromStr>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("cannot parse '{raw}'"),
        }),
        None => Ok(default),
    }
}

impl SiteConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_opt("SITE_BASE_URL")
            .unwrap_or_else(|| DEFAULT_SITE_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let port = env_parse("SITE_PORT", 8080u16)?;

        let contact = ContactConfig {
            resend_api_key: env_opt("RESEND_API_KEY").map(SecretString::from),
            contact_email: env_opt("CONTACT_EMAIL"),
            from_address: env_opt("CONTACT_FROM").unwrap_or_else(default_from_address),
            recaptcha_secret: env_opt("RECAPTCHA_SECRET_KEY").map(SecretString::from),
        };

        let calendly_base_url = env_opt("CALENDLY_BASE_URL")
            .unwrap_or_else(|| DEFAULT_CALENDLY_BASE_URL.to_string());

        let chat = ChatConfig {
            reply_delay: Duration::from_millis(env_parse("CHAT_REPLY_DELAY_MS", 1000u64)?),
            session_idle_timeout: Duration::from_secs(
                env_parse("CHAT_SESSION_IDLE_MIN", 30u64)? * 60,
            ),
        };

        Ok(Self {
            base_url,
            port,
            contact,
            calendly_base_url,
            chat,
        })
    }

    /// Names of required settings that are missing.
    ///
    /// The service still starts without them; the affected routes answer
    /// with a configuration error until they are provided.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.contact.resend_api_key.is_none() {
            missing.push("RESEND_API_KEY");
        }
        if self.contact.contact_email.is_none() {
            missing.push("CONTACT_EMAIL");
        }
        missing
    }
}
