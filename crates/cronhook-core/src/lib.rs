//! `cronhook-core` — shared types and configuration for the cronhook workspace.

pub mod config;
pub mod error;
pub mod request;

pub use config::CronhookConfig;
pub use error::{CoreError, Result};
pub use request::{BasicAuth, CookiePair, HttpMethod, RequestSpec};
