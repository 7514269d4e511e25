//! Argon2id password hashing and verification.
//!
//! Hashes use the OWASP-recommended parameters (m = 19 MiB, t = 2,
//! p = 1) with a random salt. An optional pepper is prepended to the
//! password on both sides.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use crate::error::AuthError;

fn with_pepper(password: &str, pepper: Option<&str>) -> Vec<u8> {
    match pepper {
        Some(p) => [p.as_bytes(), password.as_bytes()].concat(),
        None => password.as_bytes().to_vec(),
    }
}

fn hasher() -> Result<Argon2<'static>, AuthError> {
    let params = Params::new(19456, 2, 1, None)
        .map_err(|e| AuthError::Crypto(format!("argon2 params: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Reject passwords shorter than `min_length` characters.
pub fn check_policy(password: &str, min_length: usize) -> Result<(), AuthError> {
    if password.chars().count() < min_length {
        return Err(AuthError::WeakPassword { min: min_length });
    }
    Ok(())
}

/// Hash `password` into an Argon2id PHC string.
pub fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(&with_pepper(password, pepper), &salt)
        .map_err(|e| AuthError::Crypto(format!("hash: {e}")))?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    // Parameters are read from the PHC string, so the default instance
    // verifies hashes produced by `hasher()`.
    match Argon2::default().verify_password(&with_pepper(password, pepper), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("agenda-2026", None).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("agenda-2026", &hash, None).unwrap());
        assert!(!verify_password("agenda-2025", &hash, None).unwrap());
    }

    #[test]
    fn pepper_must_match() {
        let hash = hash_password("agenda-2026", Some("pepper!")).unwrap();
        assert!(verify_password("agenda-2026", &hash, Some("pepper!")).unwrap());
        assert!(!verify_password("agenda-2026", &hash, None).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("pw", "not-a-hash", None),
            Err(AuthError::Crypto(_))
        ));
    }

    #[test]
    fn short_passwords_fail_policy() {
        assert!(matches!(
            check_policy("short", 8),
            Err(AuthError::WeakPassword { min: 8 })
        ));
        assert!(check_policy("long-enough", 8).is_ok());
    }
}
