//! Password Safe error types using thiserror 2.0.
//!
//! Every failure mode of the client maps to one variant, with the
//! underlying cause preserved through `source` so diagnostics can walk
//! the full chain. Attempt-level transport failures carry their own
//! variants so the retry layer can classify them.

use thiserror::Error;

/// Errors raised by the Password Safe client.
#[derive(Error, Debug)]
pub enum BeyondTrustError {
    /// One or more required configuration values are absent or empty.
    #[error("Missing required configuration: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    /// A configuration value is present but unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Token acquisition exhausted its retry budget.
    #[error("Failed to acquire token after {attempts} attempts")]
    TokenAcquisition {
        /// Total attempts made against the token endpoint.
        attempts: u32,
        /// Failure from the last attempt.
        source: Box<BeyondTrustError>,
    },

    /// The session sign-in request failed or returned a non-success status.
    #[error("Session sign-in failed")]
    SignIn {
        /// Underlying transport failure, or the rejection status and body.
        source: Box<BeyondTrustError>,
    },

    /// Sign-in succeeded but the vault returned no session identity.
    #[error("Authentication succeeded but no {cookie} cookie was returned")]
    MissingSessionCookie {
        /// Name of the expected session cookie.
        cookie: String,
    },

    /// The named folder does not exist in the vault.
    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    /// A folder matched by name carries no usable identifier.
    #[error("Folder has no identifier: {0}")]
    MissingFolderId(String),

    /// A vault read failed while listing folders or secrets.
    #[error("Failed to retrieve secrets from folder {folder}")]
    SecretRetrieval {
        /// Folder whose retrieval failed.
        folder: String,
        /// Underlying transport or decode failure.
        source: Box<BeyondTrustError>,
    },

    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote endpoint answered with a non-success status.
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// Status code the endpoint returned.
        status: reqwest::StatusCode,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("Malformed response body: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

/// Result type for Password Safe operations.
pub type BeyondTrustResult<T> = Result<T, BeyondTrustError>;

impl BeyondTrustError {
    /// Check if this error is a transient, attempt-level failure.
    ///
    /// Only these variants are retried, and only inside token refresh.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::UnexpectedStatus { .. } | Self::MalformedResponse(_)
        )
    }

    /// Check if this error belongs to the authentication phase.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::TokenAcquisition { .. } | Self::SignIn { .. } | Self::MissingSessionCookie { .. }
        )
    }

    /// Check if this error means the requested folder does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::FolderNotFound(_))
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Wrap the last attempt's failure after the retry budget is spent.
    #[must_use]
    pub fn token_acquisition(attempts: u32, source: Self) -> Self {
        Self::TokenAcquisition {
            attempts,
            source: Box::new(source),
        }
    }

    /// Wrap a sign-in failure with its underlying cause.
    #[must_use]
    pub fn sign_in(source: Self) -> Self {
        Self::SignIn {
            source: Box::new(source),
        }
    }

    /// Wrap a vault read failure with the folder being retrieved.
    #[must_use]
    pub fn secret_retrieval(folder: impl Into<String>, source: Self) -> Self {
        Self::SecretRetrieval {
            folder: folder.into(),
            source: Box::new(source),
        }
    }
}
