//! Advisory Site — engagement and lead-capture backend for the advisory
//! firm's marketing website.

pub mod announcer;
pub mod chat;
pub mod config;
pub mod contact;
pub mod content;
pub mod engagement;
pub mod error;
pub mod markup;
pub mod scheduling;
pub mod server;
pub mod sessions;
pub mod sitemap;
pub mod telemetry;
pub mod timer;
