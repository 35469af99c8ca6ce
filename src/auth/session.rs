//! Identity Session Manager
//!
//! Sole owner of the signed-in session. Everything else asks it for a bearer
//! token or whether a session exists; nobody else reads or stores tokens.
//!
//! Validity is checked lazily: every `current_session` call re-reads the
//! cached (or persisted) tokens and verifies the identity token's expiry.
//! An expired session is renewed with its refresh token when possible and
//! trimmed otherwise.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::TokenProvider;
use crate::auth::models::{AuthTokens, Session, SignUpRequest};
use crate::auth::provider::IdentityProvider;
use crate::auth::storage::TokenStore;
use crate::error::{AppError, AppResult};

pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    store: TokenStore,
    cached: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: TokenStore) -> Self {
        Self {
            provider,
            store,
            cached: Mutex::new(None),
        }
    }

    /// Create an unconfirmed account. No session is established.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AppResult<()> {
        let request = SignUpRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
            display_name: display_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from),
        };
        self.provider.sign_up(&request).await
    }

    pub async fn confirm_registration(&self, email: &str, code: &str) -> AppResult<()> {
        self.provider.confirm_sign_up(email.trim(), code).await
    }

    /// Authenticate and cache the resulting session.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let tokens = self.provider.authenticate(email.trim(), password).await?;
        let session = Session::from_tokens(tokens)
            .ok_or_else(|| AppError::InvalidResponse("unreadable identity token".into()))?;

        self.persist(&session.tokens).await;
        *self.cached.lock().await = Some(session.clone());
        Ok(session)
    }

    /// Drop the local session and revoke its refresh token.
    ///
    /// Local state is always cleared, even when revocation fails. Calling
    /// this without a session does nothing.
    pub async fn sign_out(&self) {
        let cached = self.cached.lock().await.take();
        let tokens = match cached {
            Some(session) => Some(session.tokens),
            None => self.store.load().await,
        };

        let Some(tokens) = tokens else {
            debug!("Sign-out requested without an active session");
            return;
        };

        if let Some(refresh) = tokens.refresh_token.as_deref() {
            if let Err(e) = self.provider.revoke(refresh).await {
                warn!("Refresh token revocation failed: {}", e);
            }
        }
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear persisted session: {:#}", e);
        }
        info!("Signed out");
    }

    /// The current session if one exists and is still valid.
    pub async fn current_session(&self) -> Option<Session> {
        let mut cached = self.cached.lock().await;

        let candidate = match cached.take() {
            Some(session) => Some(session),
            None => self.store.load().await.and_then(Session::from_tokens),
        };
        let session = candidate?;

        if session.is_valid() {
            *cached = Some(session.clone());
            return Some(session);
        }

        debug!("Identity token expired, attempting renewal");
        let renewed = self.renew(&session.tokens).await;
        *cached = renewed.clone();
        renewed
    }

    pub async fn current_user_email(&self) -> Option<String> {
        self.current_session().await.and_then(|s| s.email)
    }

    /// Bearer token for outbound API calls.
    pub async fn id_token(&self) -> Option<String> {
        self.current_session()
            .await
            .map(|s| s.id_token().to_string())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current_session().await.is_some()
    }

    async fn renew(&self, tokens: &AuthTokens) -> Option<Session> {
        let Some(refresh) = tokens.refresh_token.as_deref() else {
            self.forget().await;
            return None;
        };

        match self.provider.refresh(refresh).await {
            Ok(mut fresh) => {
                if fresh.refresh_token.is_none() {
                    fresh.refresh_token = Some(refresh.to_string());
                }
                match Session::from_tokens(fresh).filter(Session::is_valid) {
                    Some(session) => {
                        self.persist(&session.tokens).await;
                        Some(session)
                    }
                    None => {
                        warn!("Renewed identity token is unreadable or already expired");
                        self.forget().await;
                        None
                    }
                }
            }
            Err(AppError::Identity(e)) => {
                warn!("Session renewal rejected: {}", e);
                self.forget().await;
                None
            }
            Err(e) => {
                // Keep the persisted tokens; the provider may just be unreachable.
                warn!("Session renewal failed: {}", e);
                None
            }
        }
    }

    async fn persist(&self, tokens: &AuthTokens) {
        if let Err(e) = self.store.save(tokens).await {
            warn!("Session could not be persisted: {:#}", e);
        }
    }

    async fn forget(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear persisted session: {:#}", e);
        }
    }
}

#[async_trait]
impl TokenProvider for SessionManager {
    async fn id_token(&self) -> Option<String> {
        SessionManager::id_token(self).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::jwt::issue_test_token;
    use crate::error::IdentityError;
    use chrono::Duration;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    pub(crate) const CODE: &str = "123456";

    struct Account {
        password: String,
        confirmed: bool,
    }

    #[derive(Clone, Copy)]
    enum RefreshMode {
        Fresh,
        Denied,
        Unreachable,
        Stale,
    }

    /// In-memory identity provider enforcing the rules the real pool applies.
    pub(crate) struct FakeProvider {
        accounts: StdMutex<HashMap<String, Account>>,
        token_ttl: StdMutex<Duration>,
        refresh: StdMutex<RefreshMode>,
        pub(crate) revoked: StdMutex<Vec<String>>,
    }

    impl FakeProvider {
        pub(crate) fn new() -> Self {
            Self {
                accounts: StdMutex::new(HashMap::new()),
                token_ttl: StdMutex::new(Duration::hours(1)),
                refresh: StdMutex::new(RefreshMode::Fresh),
                revoked: StdMutex::new(Vec::new()),
            }
        }

        pub(crate) fn with_confirmed(self, email: &str, password: &str) -> Self {
            self.accounts.lock().unwrap().insert(
                email.to_string(),
                Account {
                    password: password.to_string(),
                    confirmed: true,
                },
            );
            self
        }

        pub(crate) fn issue_expired_tokens(&self) {
            *self.token_ttl.lock().unwrap() = Duration::minutes(-1);
        }

        pub(crate) fn deny_refresh(&self) {
            *self.refresh.lock().unwrap() = RefreshMode::Denied;
        }

        pub(crate) fn go_offline(&self) {
            *self.refresh.lock().unwrap() = RefreshMode::Unreachable;
        }

        pub(crate) fn refresh_with_expired_tokens(&self) {
            *self.refresh.lock().unwrap() = RefreshMode::Stale;
        }

        fn tokens_for(&self, email: &str, ttl: Duration) -> AuthTokens {
            AuthTokens {
                id_token: issue_test_token(email, ttl),
                access_token: format!("access:{email}"),
                refresh_token: Some(format!("refresh:{email}")),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn sign_up(&self, request: &SignUpRequest) -> AppResult<()> {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(&request.email) {
                return Err(IdentityError::AccountExists.into());
            }
            let strong = request.password.len() >= 8
                && request.password.chars().any(|c| c.is_ascii_uppercase())
                && request.password.chars().any(|c| c.is_ascii_lowercase())
                && request.password.chars().any(|c| c.is_ascii_digit());
            if !strong {
                return Err(IdentityError::WeakCredential.into());
            }
            accounts.insert(
                request.email.clone(),
                Account {
                    password: request.password.clone(),
                    confirmed: false,
                },
            );
            Ok(())
        }

        async fn confirm_sign_up(&self, email: &str, code: &str) -> AppResult<()> {
            let mut accounts = self.accounts.lock().unwrap();
            let account = accounts
                .get_mut(email)
                .ok_or_else(|| IdentityError::Unknown("Username/client id combination not found.".into()))?;
            if code != CODE {
                return Err(IdentityError::CodeMismatch.into());
            }
            account.confirmed = true;
            Ok(())
        }

        async fn authenticate(&self, email: &str, password: &str) -> AppResult<AuthTokens> {
            let ttl = *self.token_ttl.lock().unwrap();
            let accounts = self.accounts.lock().unwrap();
            match accounts.get(email) {
                Some(account) if account.password != password => {
                    Err(IdentityError::InvalidCredentials.into())
                }
                Some(account) if !account.confirmed => Err(IdentityError::NotConfirmed.into()),
                Some(_) => Ok(self.tokens_for(email, ttl)),
                None => Err(IdentityError::InvalidCredentials.into()),
            }
        }

        async fn refresh(&self, refresh_token: &str) -> AppResult<AuthTokens> {
            let ttl = match *self.refresh.lock().unwrap() {
                RefreshMode::Fresh => Duration::hours(1),
                RefreshMode::Stale => Duration::minutes(-1),
                RefreshMode::Denied => return Err(IdentityError::InvalidCredentials.into()),
                RefreshMode::Unreachable => {
                    return Err(AppError::RequestFailed("connection refused".into()));
                }
            };
            let email = refresh_token.trim_start_matches("refresh:");
            let mut tokens = self.tokens_for(email, ttl);
            tokens.refresh_token = None;
            Ok(tokens)
        }

        async fn revoke(&self, refresh_token: &str) -> AppResult<()> {
            self.revoked.lock().unwrap().push(refresh_token.to_string());
            Ok(())
        }
    }

    fn manager(provider: FakeProvider) -> (SessionManager, Arc<FakeProvider>) {
        let provider = Arc::new(provider);
        let manager = SessionManager::new(provider.clone(), TokenStore::in_memory());
        (manager, provider)
    }

    #[tokio::test]
    async fn register_confirm_sign_in_flow() {
        let (sessions, _) = manager(FakeProvider::new());

        sessions.register("ana@example.com", "Secret123", Some("Ana")).await.unwrap();
        assert!(sessions.current_session().await.is_none());

        sessions.confirm_registration("ana@example.com", CODE).await.unwrap();
        let session = sessions.sign_in("ana@example.com", "Secret123").await.unwrap();

        assert_eq!(session.email.as_deref(), Some("ana@example.com"));
        assert_eq!(sessions.current_user_email().await.as_deref(), Some("ana@example.com"));
        assert_eq!(sessions.id_token().await, Some(session.tokens.id_token));
    }

    #[tokio::test]
    async fn register_reports_duplicates_and_weak_passwords() {
        let (sessions, _) = manager(FakeProvider::new().with_confirmed("ana@example.com", "Secret123"));

        let err = sessions.register("ana@example.com", "Other1234", None).await.unwrap_err();
        assert!(matches!(err, AppError::Identity(IdentityError::AccountExists)));

        let err = sessions.register("leo@example.com", "short", None).await.unwrap_err();
        assert!(matches!(err, AppError::Identity(IdentityError::WeakCredential)));
    }

    #[tokio::test]
    async fn unconfirmed_sign_in_creates_no_session() {
        let (sessions, _) = manager(FakeProvider::new());
        sessions.register("ana@example.com", "Secret123", None).await.unwrap();

        let err = sessions.sign_in("ana@example.com", "Secret123").await.unwrap_err();
        assert!(matches!(err, AppError::Identity(IdentityError::NotConfirmed)));
        assert!(sessions.current_session().await.is_none());
        assert!(sessions.id_token().await.is_none());
    }

    #[tokio::test]
    async fn bad_password_and_unknown_user_are_invalid_credentials() {
        let (sessions, _) = manager(FakeProvider::new().with_confirmed("ana@example.com", "Secret123"));

        for (email, password) in [("ana@example.com", "nope"), ("ghost@example.com", "Secret123")] {
            let err = sessions.sign_in(email, password).await.unwrap_err();
            assert!(matches!(err, AppError::Identity(IdentityError::InvalidCredentials)));
        }
    }

    #[tokio::test]
    async fn wrong_code_is_code_mismatch() {
        let (sessions, _) = manager(FakeProvider::new());
        sessions.register("ana@example.com", "Secret123", None).await.unwrap();

        let err = sessions.confirm_registration("ana@example.com", "000000").await.unwrap_err();
        assert!(matches!(err, AppError::Identity(IdentityError::CodeMismatch)));
    }

    #[tokio::test]
    async fn sign_out_revokes_and_is_idempotent() {
        let (sessions, provider) =
            manager(FakeProvider::new().with_confirmed("ana@example.com", "Secret123"));
        sessions.sign_in("ana@example.com", "Secret123").await.unwrap();

        sessions.sign_out().await;
        sessions.sign_out().await;

        assert!(sessions.current_session().await.is_none());
        assert_eq!(*provider.revoked.lock().unwrap(), vec!["refresh:ana@example.com".to_string()]);
    }

    #[tokio::test]
    async fn session_is_restored_from_persisted_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let provider =
            Arc::new(FakeProvider::new().with_confirmed("ana@example.com", "Secret123"));

        let first = SessionManager::new(provider.clone(), TokenStore::file(&path));
        first.sign_in("ana@example.com", "Secret123").await.unwrap();

        let second = SessionManager::new(provider, TokenStore::file(&path));
        assert_eq!(second.current_user_email().await.as_deref(), Some("ana@example.com"));
    }

    #[tokio::test]
    async fn expired_session_is_renewed_with_refresh_token() {
        let provider = FakeProvider::new().with_confirmed("ana@example.com", "Secret123");
        provider.issue_expired_tokens();
        let (sessions, _) = manager(provider);

        let stale = sessions.sign_in("ana@example.com", "Secret123").await.unwrap();
        assert!(!stale.is_valid());

        let fresh = sessions.current_session().await.unwrap();
        assert!(fresh.is_valid());
        assert_eq!(fresh.tokens.refresh_token.as_deref(), Some("refresh:ana@example.com"));
    }

    #[tokio::test]
    async fn rejected_renewal_trims_session() {
        let provider = FakeProvider::new().with_confirmed("ana@example.com", "Secret123");
        provider.issue_expired_tokens();
        provider.deny_refresh();
        let (sessions, _) = manager(provider);

        sessions.sign_in("ana@example.com", "Secret123").await.unwrap();
        assert!(sessions.current_session().await.is_none());
        assert!(sessions.store.load().await.is_none());
    }

    #[tokio::test]
    async fn unreachable_provider_keeps_persisted_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let provider = Arc::new(FakeProvider::new().with_confirmed("ana@example.com", "Secret123"));
        provider.issue_expired_tokens();
        provider.go_offline();

        let sessions = SessionManager::new(provider.clone(), TokenStore::file(&path));
        sessions.sign_in("ana@example.com", "Secret123").await.unwrap();

        assert!(sessions.current_session().await.is_none());
        assert!(TokenStore::file(&path).load().await.is_some());

        // Once the provider is back the kept refresh token renews the session.
        let later = SessionManager::new(provider.clone(), TokenStore::file(&path));
        *provider.refresh.lock().unwrap() = RefreshMode::Fresh;
        assert!(later.current_session().await.unwrap().is_valid());
    }

    #[tokio::test]
    async fn expired_renewal_result_clears_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let provider = Arc::new(FakeProvider::new().with_confirmed("ana@example.com", "Secret123"));
        provider.issue_expired_tokens();
        provider.refresh_with_expired_tokens();

        let sessions = SessionManager::new(provider, TokenStore::file(&path));
        sessions.sign_in("ana@example.com", "Secret123").await.unwrap();

        assert!(sessions.current_session().await.is_none());
        assert!(TokenStore::file(&path).load().await.is_none());
    }

    #[tokio::test]
    async fn token_provider_is_none_when_signed_out() {
        let (sessions, _) = manager(FakeProvider::new());
        let provider: &dyn TokenProvider = &sessions;
        assert!(provider.id_token().await.is_none());
    }
}
