//! # API Module
//!
//! HTTP access to the catalog service: the authenticated JSON client, the
//! five catalog routes and the `/config` bootstrap call.

pub mod bootstrap;
pub mod cars;
pub mod client;

pub use bootstrap::ConfigSource;
pub use cars::CarsApi;
pub use client::{ApiClient, TokenProvider};
