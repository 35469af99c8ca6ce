//! Identity Token Claims
//!
//! Reads the claims of identity tokens issued by the user pool. The client
//! holds no signing key, so signatures are not verified here; the catalog API
//! verifies them. Only expiry and the email claim matter on this side.

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// Claims carried by a user pool identity token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User unique identifier
    pub sub: String,
    /// User email
    #[serde(default)]
    pub email: Option<String>,
    /// Token issued at timestamp
    #[serde(default)]
    pub iat: Option<i64>,
    /// Token expiration timestamp
    pub exp: i64,
    /// Token issuer
    #[serde(default)]
    pub iss: Option<String>,
    /// `id` or `access`
    #[serde(default)]
    pub token_use: Option<String>,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at() <= now
    }
}

/// Decode the payload of a token without checking its signature or expiry.
pub fn decode_claims(token: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .context("Failed to decode identity token")?;
    Ok(data.claims)
}

/// Mint an HS256 token with the given claims, for tests only.
#[cfg(test)]
pub(crate) fn issue_test_token(email: &str, ttl: chrono::Duration) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let now = Utc::now();
    let claims = Claims {
        sub: format!("sub-{email}"),
        email: Some(email.to_string()),
        iat: Some(now.timestamp()),
        exp: (now + ttl).timestamp(),
        iss: Some("https://cognito-idp.us-east-1.amazonaws.com/us-east-1_test".to_string()),
        token_use: Some("id".to_string()),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test_secret"))
        .expect("test token encodes")
}
