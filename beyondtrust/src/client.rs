//! Password Safe client: folder resolution and secret retrieval.

use crate::auth::{AuthHeaders, CredentialManager};
use crate::config::ClientConfig;
use crate::error::{BeyondTrustError, BeyondTrustResult};
use crate::models::{Folder, SecretRecord};
use crate::provider::SecretProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, error, info, instrument};

/// Client for the Password Safe secret endpoints.
///
/// Construct one instance at startup and share it by reference (or
/// `Arc`); all internal state, including the token cache, is owned by
/// the instance.
#[derive(Debug)]
pub struct PasswordSafeClient {
    config: ClientConfig,
    http: Client,
    credentials: CredentialManager,
}

impl PasswordSafeClient {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BeyondTrustError::Http`] if the HTTP transport cannot
    /// be built.
    pub fn new(config: ClientConfig) -> BeyondTrustResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls()
            .build()
            .map_err(BeyondTrustError::Http)?;
        let credentials = CredentialManager::new(config.clone(), http.clone());

        info!("BeyondTrust client initialized");
        Ok(Self {
            config,
            http,
            credentials,
        })
    }

    /// Create a new client from the `BT_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a configuration error listing every missing variable, or
    /// a transport error if the HTTP client cannot be built.
    pub fn from_env() -> BeyondTrustResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Access the credential manager, for callers that need raw tokens
    /// or headers against endpoints this client does not cover.
    #[must_use]
    pub const fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    /// Retrieve all secrets in the named folder as title/value pairs.
    ///
    /// The folder name match is exact and case-sensitive; if the vault
    /// holds several folders with the same name, the first entry it
    /// returns wins. Secrets without a password map to an empty string,
    /// and duplicate titles resolve to the last entry listed.
    ///
    /// # Errors
    ///
    /// Returns [`BeyondTrustError::FolderNotFound`] if no folder matches,
    /// [`BeyondTrustError::MissingFolderId`] if the matched folder has no
    /// identifier, authentication errors unwrapped, and any transport or
    /// decode failure wrapped as [`BeyondTrustError::SecretRetrieval`].
    #[instrument(skip(self), fields(folder = %folder_name))]
    pub async fn get_secrets(
        &self,
        folder_name: &str,
    ) -> BeyondTrustResult<HashMap<String, String>> {
        let headers = self.credentials.auth_headers().await?;

        let folders: Vec<Folder> = self
            .read_json(&format!("{}/Folders", self.config.base_url), &headers)
            .await
            .map_err(|source| retrieval_error(folder_name, source))?;

        let folder = folders
            .iter()
            .find(|folder| folder.name.as_deref() == Some(folder_name))
            .ok_or_else(|| BeyondTrustError::FolderNotFound(folder_name.to_string()))?;
        let id = folder
            .id
            .as_ref()
            .ok_or_else(|| BeyondTrustError::MissingFolderId(folder_name.to_string()))?;

        let records: Vec<SecretRecord> = self
            .read_json(
                &format!("{}/Folders/{}/secrets", self.config.base_url, id),
                &headers,
            )
            .await
            .map_err(|source| retrieval_error(folder_name, source))?;

        let secrets: HashMap<String, String> = records
            .into_iter()
            .map(|record| (record.title, record.password.unwrap_or_default()))
            .collect();

        debug!(count = secrets.len(), "Secrets retrieved");
        Ok(secrets)
    }

    /// Authenticated GET returning a decoded JSON body.
    async fn read_json<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &AuthHeaders,
    ) -> BeyondTrustResult<T> {
        let response = headers.apply(self.http.get(url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BeyondTrustError::UnexpectedStatus { status, body });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn retrieval_error(folder_name: &str, source: BeyondTrustError) -> BeyondTrustError {
    error!(error = %source, "API communication error");
    BeyondTrustError::secret_retrieval(folder_name, source)
}

#[async_trait]
impl SecretProvider for PasswordSafeClient {
    type Error = BeyondTrustError;

    async fn get_secrets(
        &self,
        folder_name: &str,
    ) -> BeyondTrustResult<HashMap<String, String>> {
        PasswordSafeClient::get_secrets(self, folder_name).await
    }
}
