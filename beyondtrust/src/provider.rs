//! Generic secret provider trait.
//!
//! Task-automation consumers depend on this seam instead of the
//! concrete client, so tests can substitute a canned provider.

use async_trait::async_trait;
use std::collections::HashMap;

/// Folder-level secret retrieval abstraction.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Error type surfaced by the provider.
    type Error: std::error::Error + Send + Sync;

    /// Fetch every secret in the named folder as title/value pairs.
    async fn get_secrets(
        &self,
        folder_name: &str,
    ) -> Result<HashMap<String, String>, Self::Error>;
}
