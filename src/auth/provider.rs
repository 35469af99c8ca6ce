//! Identity provider seam
//!
//! The session manager talks to the hosted identity service only through this
//! trait, so tests can substitute an in-memory provider.

use async_trait::async_trait;

use crate::auth::models::{AuthTokens, SignUpRequest};
use crate::error::AppResult;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an unconfirmed account.
    async fn sign_up(&self, request: &SignUpRequest) -> AppResult<()>;

    /// Confirm an account with the code sent by email.
    async fn confirm_sign_up(&self, email: &str, code: &str) -> AppResult<()>;

    /// Exchange credentials for a token set.
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<AuthTokens>;

    /// Exchange a refresh token for fresh identity and access tokens.
    async fn refresh(&self, refresh_token: &str) -> AppResult<AuthTokens>;

    /// Revoke a refresh token and the tokens issued from it.
    async fn revoke(&self, refresh_token: &str) -> AppResult<()>;
}
