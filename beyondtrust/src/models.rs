//! Wire types for the Password Safe REST API.

use serde::Deserialize;
use std::fmt;

/// OAuth2 token endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

const fn default_expires_in() -> u64 {
    3600
}

/// Folder entry from `GET /Folders`.
///
/// Entries without a `Name` are tolerated and skipped during scans.
#[derive(Debug, Deserialize)]
pub(crate) struct Folder {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Id", alias = "ID")]
    pub id: Option<FolderId>,
}

/// Folder identifier, numeric or GUID depending on the deployment.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum FolderId {
    Numeric(i64),
    Guid(String),
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => id.fmt(f),
            Self::Guid(id) => f.write_str(id),
        }
    }
}

/// Secret entry from `GET /Folders/{id}/secrets`.
#[derive(Debug, Deserialize)]
pub(crate) struct SecretRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Password")]
    pub password: Option<String>,
}
