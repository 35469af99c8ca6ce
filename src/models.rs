//! Catalog Models
//!
//! Wire shapes exchanged with the catalog API.

use serde::{Deserialize, Serialize};

/// A vehicle record as returned by the server.
///
/// `id`, `created_at` and `updated_at` are server-authoritative; the client
/// never sets them. Timestamps are kept as the server sent them and only
/// parsed for display, so an odd or missing value never rejects the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Body of create (POST) and update (PUT) requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarPayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CarPayload {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }
}

/// Acknowledgment returned by DELETE
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: String,
}

/// Identity provider settings served by `GET /config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitoConfig {
    pub user_pool_id: String,
    pub user_pool_client_id: String,
    pub region: String,
}
