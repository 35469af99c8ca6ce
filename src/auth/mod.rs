//! # Authentication Module
//!
//! Account registration, sign-in and the lifecycle of the signed-in session.
//! The hosted user pool does the actual authentication; this module caches,
//! persists and renews the tokens it hands out.

pub mod cognito;
pub mod jwt;
pub mod models;
pub mod provider;
pub mod session;
pub mod storage;

pub use cognito::CognitoProvider;
pub use session::SessionManager;
pub use storage::TokenStore;
