//! Contact form endpoint — validates a submission, optionally checks
//! reCAPTCHA, and emails it to the firm's inbox through Resend.

pub mod mailer;
pub mod model;
pub mod recaptcha;
pub mod routes;
pub mod service;

pub use mailer::{ContactMailer, ResendMailer};
pub use model::{ContactSubmission, OutboundEmail};
pub use recaptcha::{BotVerifier, RecaptchaVerifier};
pub use routes::{ContactRouteState, contact_routes};
pub use service::ContactService;
