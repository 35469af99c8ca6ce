//! Authentication Models
//!
//! Token and session data held by the session manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::jwt;

/// Tokens returned by the identity provider after authentication
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub id_token: String,
    pub access_token: String,
    /// Absent on refresh responses; the previous refresh token stays valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens")
            .field("id_token", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// An authenticated session derived from a token set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub tokens: AuthTokens,
    pub email: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Build a session from tokens, reading expiry and email from the
    /// identity token. Returns `None` when the identity token is unreadable.
    pub fn from_tokens(tokens: AuthTokens) -> Option<Self> {
        let claims = match jwt::decode_claims(&tokens.id_token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("Discarding session with unreadable identity token: {:#}", e);
                return None;
            }
        };
        Some(Self {
            email: claims.email.clone(),
            expires_at: claims.expires_at(),
            tokens,
        })
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn id_token(&self) -> &str {
        &self.tokens.id_token
    }
}

/// New account submitted to the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    /// Sent as the `name` attribute when present
    pub display_name: Option<String>,
}
