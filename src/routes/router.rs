//! Location tracking for the terminal client
//!
//! Paths mirror the ones the hosted web client uses, so a location can be
//! passed on the command line and remembered across a sign-in redirect.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::auth::SessionManager;
use crate::routes::guard::{self, GuardState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Catalog,
}

impl Route {
    /// Anything that is not an auth screen resolves to the catalog.
    pub fn parse(path: &str) -> Self {
        match path.trim().trim_end_matches('/') {
            "/login" => Route::Login,
            "/register" => Route::Register,
            _ => Route::Catalog,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Catalog => "/",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

pub struct Router {
    sessions: Arc<SessionManager>,
    location: String,
    guard: GuardState,
    return_to: Option<String>,
}

impl Router {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self {
            sessions,
            location: Route::Catalog.path().to_string(),
            guard: GuardState::Pending,
            return_to: None,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn route(&self) -> Route {
        Route::parse(&self.location)
    }

    pub fn guard(&self) -> &GuardState {
        &self.guard
    }

    /// Location a sign-in will return to
    pub fn return_to(&self) -> Option<&str> {
        self.return_to.as_deref()
    }

    /// Enter `path` and leave the guard pending until `resolve` runs.
    pub fn begin(&mut self, path: &str) {
        self.location = path.to_string();
        self.guard = GuardState::Pending;
    }

    /// Run the access check for the current location, following at most one
    /// redirect. Returns the route that ends up displayed.
    pub async fn resolve(&mut self) -> Route {
        let state = guard::check(&self.sessions, &self.location).await;
        match &state {
            GuardState::Redirect { to, from } => {
                if *to == Route::Login {
                    self.return_to = Some(from.clone());
                }
                self.location = to.path().to_string();
                self.guard = GuardState::Allowed;
            }
            _ => self.guard = state,
        }
        self.route()
    }

    pub async fn navigate(&mut self, path: &str) -> Route {
        self.begin(path);
        self.resolve().await
    }

    /// Leave the auth screens after a successful sign-in, returning to the
    /// location the guard remembered.
    pub async fn signed_in(&mut self) -> Route {
        let target = self
            .return_to
            .take()
            .unwrap_or_else(|| Route::Catalog.path().to_string());
        self.navigate(&target).await
    }

    /// Sign out and land on `/login`.
    pub async fn sign_out(&mut self) -> Route {
        self.sessions.sign_out().await;
        self.return_to = None;
        info!("Returning to sign-in");
        self.navigate(Route::Login.path()).await
    }
}
