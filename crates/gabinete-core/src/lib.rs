//! Gabinete Core: domain types shared by every crate of the access
//! core: permissions, roles, profiles, overrides, identity sessions,
//! the error taxonomy and the store traits the backend implements.

pub mod catalog;
pub mod error;
pub mod identity;
pub mod models;
pub mod repository;

pub use error::{GabineteError, GabineteResult};
