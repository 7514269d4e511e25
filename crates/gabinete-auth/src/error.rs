//! Authentication error types.

use gabinete_core::error::GabineteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("session has expired")]
    SessionExpired,

    #[error("no active session")]
    NoSession,

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("session lifetime of {secs}s is out of range")]
    InvalidLifetime { secs: u64 },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for GabineteError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::SessionExpired | AuthError::NoSession => {
                GabineteError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::WeakPassword { .. } | AuthError::InvalidLifetime { .. } => {
                GabineteError::Validation {
                    message: err.to_string(),
                }
            }
            AuthError::Crypto(msg) => GabineteError::Crypto(msg),
        }
    }
}
