//! Error Types
//!
//! Every failure the client can surface to a view. Display strings of the
//! catalog variants are user-facing; identity variants are translated by the
//! views into cause-specific messages.

use thiserror::Error;

/// Fixed message shown whenever the catalog API answers 401.
pub const SESSION_EXPIRED_MESSAGE: &str = "Sesión expirada. Por favor inicia sesión de nuevo.";

/// Fallback when a failed response carries no `error` field.
pub const REQUEST_FAILED_FALLBACK: &str = "Error en la solicitud";

/// Failures reported by the hosted identity provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("an account with this email already exists")]
    AccountExists,

    #[error("password does not satisfy the provider policy")]
    WeakCredential,

    #[error("account has not been confirmed")]
    NotConfirmed,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("confirmation code mismatch")]
    CodeMismatch,

    #[error("{0}")]
    Unknown(String),
}

impl IdentityError {
    /// Map a provider exception name (`__type`) to a typed failure.
    ///
    /// Exception names may arrive namespace-prefixed
    /// (`com.amazonaws...#CodeMismatchException`), only the suffix is used.
    pub fn from_exception(exception: &str, message: Option<&str>) -> Self {
        let name = exception.rsplit('#').next().unwrap_or(exception);
        match name {
            "UsernameExistsException" => IdentityError::AccountExists,
            "InvalidPasswordException" => IdentityError::WeakCredential,
            "UserNotConfirmedException" => IdentityError::NotConfirmed,
            "NotAuthorizedException" | "UserNotFoundException" => {
                IdentityError::InvalidCredentials
            }
            "CodeMismatchException" => IdentityError::CodeMismatch,
            other => IdentityError::Unknown(
                message
                    .filter(|m| !m.is_empty())
                    .unwrap_or(other)
                    .to_string(),
            ),
        }
    }
}

/// Application-wide error
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or expired session rejected by the catalog API
    #[error("{}", SESSION_EXPIRED_MESSAGE)]
    Unauthorized,

    /// Any other non-2xx catalog response, carrying the server's message
    #[error("{0}")]
    RequestFailed(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The `/config` bootstrap call failed
    #[error("No se pudo obtener la configuración")]
    ConfigUnavailable,

    #[error("No se pudo conectar con el servidor: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Respuesta inválida del servidor: {0}")]
    InvalidResponse(String),
}

pub type AppResult<T> = Result<T, AppError>;
