//! BeyondTrust Password Safe client for task-automation pipelines.
//!
//! Authenticates with OAuth2 client credentials, exchanges the bearer
//! token for the vault's session cookie, and reads every secret in a
//! named folder as a title/value map.
//!
//! # Features
//! - Cached token with a 30-second expiry buffer, refreshed at most
//!   once per expiry cycle under concurrent callers
//! - Bounded retry with linear backoff on transient refresh failures
//! - Per-call session sign-in (the cookie is never cached)
//! - `tracing` events throughout; no subscriber is installed

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
mod models;
pub mod provider;
pub mod retry;

pub use auth::{AuthHeaders, CredentialManager};
pub use client::PasswordSafeClient;
pub use config::ClientConfig;
pub use error::{BeyondTrustError, BeyondTrustResult};
pub use provider::SecretProvider;
pub use retry::{RetryConfig, RetryPolicy};
