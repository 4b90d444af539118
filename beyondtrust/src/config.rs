//! Client configuration for the Password Safe API.
//!
//! All five endpoint/credential values are required and validated at
//! construction; a missing or empty value is a fatal constructor error
//! that lists every absent name. Environment loading reads the `BT_*`
//! variables, with `.env` support via dotenvy.

use crate::error::{BeyondTrustError, BeyondTrustResult};
use crate::retry::RetryConfig;
use secrecy::SecretString;
use std::env;
use std::time::Duration;
use url::Url;

/// Session cookie the vault's sign-in endpoint issues by default.
pub const DEFAULT_SESSION_COOKIE: &str = "ASP.NET_SessionId";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Password Safe client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// OAuth2 token endpoint
    pub token_url: String,
    /// Session sign-in endpoint
    pub sign_in_url: String,
    /// OAuth2 client identifier
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: SecretString,
    /// Base URL for the vault's read endpoints
    pub base_url: String,
    /// Name of the session cookie returned by sign-in
    pub session_cookie_name: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retry behavior for token acquisition
    pub retry: RetryConfig,
}

impl ClientConfig {
    /// Create a configuration from the five required values.
    ///
    /// # Errors
    ///
    /// Returns [`BeyondTrustError::MissingConfig`] naming every empty
    /// value, or [`BeyondTrustError::InvalidConfig`] if a URL does not
    /// parse.
    pub fn new(
        token_url: impl Into<String>,
        sign_in_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> BeyondTrustResult<Self> {
        let config = Self {
            token_url: token_url.into(),
            sign_in_url: sign_in_url.into(),
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            base_url: base_url.into(),
            session_cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `BT_TOKEN_URL`, `BT_SIGN_IN_URL`, `BT_CLIENT_ID`,
    /// `BT_CLIENT_SECRET` and `BT_BASE_URL` (a `.env` file is honored if
    /// present), plus the optional overrides `BT_SESSION_COOKIE_NAME`,
    /// `BT_TIMEOUT_SECS`, `BT_RETRY_ATTEMPTS` and `BT_RETRY_BACKOFF_SECS`.
    ///
    /// # Errors
    ///
    /// Returns [`BeyondTrustError::MissingConfig`] listing every required
    /// variable that is unset or empty, or
    /// [`BeyondTrustError::InvalidConfig`] for values that fail to parse.
    pub fn from_env() -> BeyondTrustResult<Self> {
        dotenvy::dotenv().ok();

        let mut missing = Vec::new();
        let token_url = require_env("BT_TOKEN_URL", &mut missing);
        let sign_in_url = require_env("BT_SIGN_IN_URL", &mut missing);
        let client_id = require_env("BT_CLIENT_ID", &mut missing);
        let client_secret = require_env("BT_CLIENT_SECRET", &mut missing);
        let base_url = require_env("BT_BASE_URL", &mut missing);

        if !missing.is_empty() {
            return Err(BeyondTrustError::MissingConfig(missing));
        }

        let session_cookie_name = env::var("BT_SESSION_COOKIE_NAME")
            .unwrap_or_else(|_| DEFAULT_SESSION_COOKIE.to_string());
        let timeout = Duration::from_secs(parse_env("BT_TIMEOUT_SECS", 10)?);
        let retry = RetryConfig::default()
            .with_max_attempts(parse_env("BT_RETRY_ATTEMPTS", 3)?)
            .with_backoff_base(Duration::from_secs(parse_env("BT_RETRY_BACKOFF_SECS", 2)?));

        let config = Self {
            token_url,
            sign_in_url,
            client_id,
            client_secret: SecretString::from(client_secret),
            base_url,
            session_cookie_name,
            timeout,
            retry,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the session cookie name expected from sign-in.
    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.session_cookie_name = name.into();
        self
    }

    /// Set the retry behavior for token acquisition.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn validate(&self) -> BeyondTrustResult<()> {
        use secrecy::ExposeSecret;

        let mut missing = Vec::new();
        if self.token_url.is_empty() {
            missing.push("token_url".to_string());
        }
        if self.sign_in_url.is_empty() {
            missing.push("sign_in_url".to_string());
        }
        if self.client_id.is_empty() {
            missing.push("client_id".to_string());
        }
        if self.client_secret.expose_secret().is_empty() {
            missing.push("client_secret".to_string());
        }
        if self.base_url.is_empty() {
            missing.push("base_url".to_string());
        }
        if !missing.is_empty() {
            return Err(BeyondTrustError::MissingConfig(missing));
        }

        for (name, value) in [
            ("token_url", &self.token_url),
            ("sign_in_url", &self.sign_in_url),
            ("base_url", &self.base_url),
        ] {
            Url::parse(value)
                .map_err(|e| BeyondTrustError::invalid_config(format!("{name}: {e}")))?;
        }
        Ok(())
    }
}

/// Read a required variable, recording its name when unset or empty.
fn require_env(name: &str, missing: &mut Vec<String>) -> String {
    match env::var(name) {
        Ok(value) if !value.is_empty() => value,
        _ => {
            missing.push(name.to_string());
            String::new()
        }
    }
}

/// Parse an environment variable with a default value.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> BeyondTrustResult<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| BeyondTrustError::invalid_config(format!("{name}: {e}"))),
        Err(_) => Ok(default),
    }
}
