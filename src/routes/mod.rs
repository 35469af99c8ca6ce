//! # Routes Module
//!
//! Screen locations and the session guard in front of them.
//!
//! ## Locations
//! - `/login`: sign-in screen
//! - `/register`: account creation and email confirmation
//! - `/` (and any other path): the catalog, only with a valid session

pub mod guard;
pub mod router;

pub use router::{Route, Router};
