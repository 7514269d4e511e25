//! Gabinete Database: SurrealDB connection management, schema
//! migrations and the repository implementations behind the
//! `gabinete-core` store traits.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Repositories for profiles, roles, permissions, overrides and
//!   credentials ([`repository`])
//! - Default catalog bootstrap ([`seed_default_catalog`])

mod connection;
mod error;
pub mod repository;
mod schema;
mod seed;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
pub use seed::{SeedReport, seed_default_catalog};
