//! # Views Module
//!
//! Screen state for the terminal client. Each view owns its form fields,
//! its inline error and its loading flag; the interactive loop in `app`
//! only collects input and prints what the views expose.

pub mod catalog;
pub mod form;
pub mod format;
pub mod login;
pub mod register;

pub use catalog::CatalogView;
pub use form::CarForm;
pub use login::LoginView;
pub use register::{RegisterStep, RegisterView};

use crate::error::{AppError, IdentityError};

/// User-facing message for a failed identity operation.
///
/// Known provider causes get a fixed Spanish message; anything else shows
/// the provider's own text, or `fallback` when it is empty.
pub fn auth_error_message(err: &AppError, fallback: &str) -> String {
    let message = match err {
        AppError::Identity(IdentityError::NotConfirmed) => {
            "Debes confirmar tu email. Revisa tu bandeja de entrada."
        }
        AppError::Identity(IdentityError::InvalidCredentials) => "Email o contraseña incorrectos.",
        AppError::Identity(IdentityError::AccountExists) => "Ya existe una cuenta con este email.",
        AppError::Identity(IdentityError::WeakCredential) => {
            "La contraseña debe tener al menos 8 caracteres, mayúsculas, minúsculas y números."
        }
        AppError::Identity(IdentityError::CodeMismatch) => "Código incorrecto. Revisa tu email.",
        other => {
            let text = other.to_string();
            return if text.trim().is_empty() {
                fallback.to_string()
            } else {
                text
            };
        }
    };
    message.to_string()
}
