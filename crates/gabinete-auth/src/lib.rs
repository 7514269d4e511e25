//! Gabinete Auth: a local password identity provider.
//!
//! Verifies Argon2id credentials, issues opaque session tokens and
//! notifies subscribers whenever the current session changes.

pub mod config;
pub mod error;
pub mod password;
pub mod provider;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use provider::PasswordIdentityProvider;
