//! Identity provider configuration.

/// Configuration for [`crate::PasswordIdentityProvider`].
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Optional pepper prepended to passwords before Argon2id hashing
    /// and verification.
    pub pepper: Option<String>,
    /// Session lifetime in seconds (default: 3600 = 1 hour).
    pub session_lifetime_secs: u64,
    /// Minimum password length accepted by `register` (default: 8).
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            session_lifetime_secs: 3600,
            min_password_length: 8,
        }
    }
}
