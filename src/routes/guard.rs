use tracing::debug;

use crate::auth::SessionManager;
use crate::routes::router::Route;

/// Outcome of the access check for a requested location.
///
/// `Pending` is the neutral state while the session lookup is in flight;
/// nothing but a loading indicator is rendered in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    Pending,
    Allowed,
    Redirect { to: Route, from: String },
}

/// Decide whether `requested` may be shown.
///
/// The catalog needs a valid session and otherwise redirects to `/login`,
/// carrying the requested location. The login and register screens bounce
/// an authenticated user back to `/`.
pub async fn check(sessions: &SessionManager, requested: &str) -> GuardState {
    let route = Route::parse(requested);
    let authenticated = sessions.is_authenticated().await;

    let state = match (route, authenticated) {
        (Route::Catalog, true) => GuardState::Allowed,
        (Route::Catalog, false) => GuardState::Redirect {
            to: Route::Login,
            from: requested.to_string(),
        },
        (Route::Login | Route::Register, true) => GuardState::Redirect {
            to: Route::Catalog,
            from: requested.to_string(),
        },
        (Route::Login | Route::Register, false) => GuardState::Allowed,
    };
    debug!(path = requested, ?state, "Route checked");
    state
}
