//! # Store Module
//!
//! Client-side state mirrored from the catalog API.

pub mod catalog;

pub use catalog::CatalogStore;
