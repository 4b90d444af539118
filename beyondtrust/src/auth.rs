//! Credential lifecycle: cached OAuth2 token plus derived session identity.
//!
//! The manager owns the only shared mutable state in the client, a
//! single token slot behind a [`tokio::sync::Mutex`]. The guard is held
//! across the whole check-and-refresh sequence so concurrent callers
//! never trigger redundant refreshes; contending callers wait on the
//! lock instead. The session cookie is deliberately not cached: it has
//! its own server-side lifetime, so sign-in runs on every
//! authenticated call.

use crate::config::ClientConfig;
use crate::error::{BeyondTrustError, BeyondTrustResult};
use crate::models::TokenResponse;
use crate::retry::RetryPolicy;
use reqwest::{Client, RequestBuilder, header};
use secrecy::ExposeSecret;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Bearer token with its buffered expiry instant.
///
/// Replaced wholesale on refresh, never partially updated. The token
/// material is wiped when the value is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct CachedToken {
    access_token: String,
    #[zeroize(skip)]
    expires_at: Instant,
}

impl CachedToken {
    /// Safety margin between the vault-reported and the enforced expiry,
    /// so a token judged valid cannot expire before it is used.
    const EXPIRY_BUFFER: Duration = Duration::from_secs(30);

    /// Ceiling on the enforced lifetime. `Instant` arithmetic overflows
    /// on absurd `expires_in` values, so anything past the cap is
    /// treated as a month-long token and refreshed then.
    const MAX_LIFETIME: Duration = Duration::from_secs(30 * 24 * 60 * 60);

    fn new(access_token: String, expires_in: u64, now: Instant) -> Self {
        let lifetime = Duration::from_secs(expires_in)
            .saturating_sub(Self::EXPIRY_BUFFER)
            .min(Self::MAX_LIFETIME);
        Self {
            access_token,
            expires_at: now + lifetime,
        }
    }

    fn access_token(&self) -> &str {
        &self.access_token
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Per-call authentication headers: bearer token plus session cookie.
///
/// Derived fresh for every authenticated call and owned by the caller;
/// never cached.
pub struct AuthHeaders {
    token: String,
    cookie: String,
}

impl AuthHeaders {
    fn new(token: String, cookie_name: &str, session_id: &str) -> Self {
        Self {
            token,
            cookie: format!("{cookie_name}={session_id}"),
        }
    }

    /// Attach the bearer token, session cookie and JSON accept headers
    /// to a request.
    #[must_use]
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header(header::COOKIE, self.cookie.as_str())
            .header(header::ACCEPT, "application/json")
    }
}

impl fmt::Debug for AuthHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHeaders")
            .field("token", &"[REDACTED]")
            .field("cookie", &"[REDACTED]")
            .finish()
    }
}

/// Acquires, caches and refreshes the client's credentials.
pub struct CredentialManager {
    config: ClientConfig,
    http: Client,
    token: Mutex<Option<CachedToken>>,
    retry: RetryPolicy,
}

impl CredentialManager {
    /// Create a manager sharing the given HTTP transport.
    #[must_use]
    pub fn new(config: ClientConfig, http: Client) -> Self {
        let retry = RetryPolicy::new(config.retry.clone());
        Self {
            config,
            http,
            token: Mutex::new(None),
            retry,
        }
    }

    /// Get a bearer token guaranteed not to be past its buffered expiry.
    ///
    /// Holds the token slot's guard across the staleness check and any
    /// refresh, so at most one network refresh happens per expiry cycle
    /// under contention.
    ///
    /// # Errors
    ///
    /// Returns [`BeyondTrustError::TokenAcquisition`] once the refresh
    /// retry budget is exhausted.
    pub async fn valid_token(&self) -> BeyondTrustResult<String> {
        let mut slot = self.token.lock().await;
        match slot.as_ref() {
            Some(cached) if !cached.is_expired(Instant::now()) => {
                Ok(cached.access_token().to_string())
            }
            _ => {
                let fresh = self.refresh().await?;
                let token = fresh.access_token().to_string();
                *slot = Some(fresh);
                Ok(token)
            }
        }
    }

    /// Derive the per-call authentication headers.
    ///
    /// Signs in with a valid bearer token and extracts the configured
    /// session cookie from the response.
    ///
    /// # Errors
    ///
    /// Returns [`BeyondTrustError::SignIn`] if the sign-in request fails
    /// or answers with a non-success status, and
    /// [`BeyondTrustError::MissingSessionCookie`] if the response carries
    /// no session identity. The latter signals a server-side contract
    /// violation and is never retried.
    #[instrument(skip(self))]
    pub async fn auth_headers(&self) -> BeyondTrustResult<AuthHeaders> {
        let token = self.valid_token().await?;

        let response = self
            .http
            .post(&self.config.sign_in_url)
            .bearer_auth(&token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| BeyondTrustError::sign_in(source.into()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BeyondTrustError::sign_in(
                BeyondTrustError::UnexpectedStatus { status, body },
            ));
        }

        let session_id = response
            .cookies()
            .find(|cookie| cookie.name() == self.config.session_cookie_name)
            .map(|cookie| cookie.value().to_string())
            .ok_or_else(|| BeyondTrustError::MissingSessionCookie {
                cookie: self.config.session_cookie_name.clone(),
            })?;

        debug!("Session sign-in complete");
        Ok(AuthHeaders::new(
            token,
            &self.config.session_cookie_name,
            &session_id,
        ))
    }

    /// Acquire a fresh token, retrying transient failures.
    #[instrument(skip(self))]
    async fn refresh(&self) -> BeyondTrustResult<CachedToken> {
        self.retry
            .execute(|| self.request_token())
            .await
            .map_err(|source| {
                BeyondTrustError::token_acquisition(self.retry.max_attempts(), source)
            })
    }

    /// Single client-credentials attempt against the token endpoint.
    async fn request_token(&self) -> BeyondTrustResult<CachedToken> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret()),
            ("grant_type", "client_credentials"),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BeyondTrustError::UnexpectedStatus { status, body });
        }

        let body = response.bytes().await?;
        let parsed: TokenResponse = serde_json::from_slice(&body)?;
        info!(expires_in_secs = parsed.expires_in, "OAuth token refreshed");
        Ok(CachedToken::new(
            parsed.access_token,
            parsed.expires_in,
            Instant::now(),
        ))
    }
}

impl fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialManager")
            .field("config", &self.config)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_applies_thirty_second_buffer() {
        let now = Instant::now();
        let token = CachedToken::new("tok".to_string(), 3600, now);
        assert_eq!(token.expires_at, now + Duration::from_secs(3570));
    }

    #[test]
    fn test_expiry_saturates_for_short_lifetimes() {
        let now = Instant::now();
        let token = CachedToken::new("tok".to_string(), 30, now);
        assert_eq!(token.expires_at, now);
        assert!(token.is_expired(now));

        let token = CachedToken::new("tok".to_string(), 10, now);
        assert!(token.is_expired(now));
    }

    #[test]
    fn test_expiry_caps_absurd_lifetimes() {
        let now = Instant::now();
        let token = CachedToken::new("tok".to_string(), u64::MAX, now);

        assert_eq!(token.expires_at, now + CachedToken::MAX_LIFETIME);
        assert!(!token.is_expired(now));
    }

    #[test]
    fn test_token_invalid_at_exact_expiry() {
        let now = Instant::now();
        let token = CachedToken::new("tok".to_string(), 90, now);

        assert!(!token.is_expired(now + Duration::from_secs(59)));
        assert!(token.is_expired(now + Duration::from_secs(60)));
        assert!(token.is_expired(now + Duration::from_secs(61)));
    }

    #[test]
    fn test_cached_token_debug_redacts_material() {
        let token = CachedToken::new("very-secret-token".to_string(), 3600, Instant::now());
        let debug = format!("{token:?}");
        assert!(!debug.contains("very-secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_auth_headers_cookie_format() {
        let headers = AuthHeaders::new("tok".to_string(), "ASP.NET_SessionId", "abc123");
        assert_eq!(headers.cookie, "ASP.NET_SessionId=abc123");
    }

    #[test]
    fn test_auth_headers_debug_redacts_both_values() {
        let headers = AuthHeaders::new("tok-value".to_string(), "ASP.NET_SessionId", "abc123");
        let debug = format!("{headers:?}");
        assert!(!debug.contains("tok-value"));
        assert!(!debug.contains("abc123"));
        assert!(debug.contains("[REDACTED]"));
    }
}
