//! Identity sessions issued by the identity provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated identity as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySession {
    pub user_id: Uuid,
    pub email: String,
    /// Opaque bearer token. Never logged.
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl IdentitySession {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Out-of-band session change emitted by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(IdentitySession),
    TokenRefreshed(IdentitySession),
    SignedOut,
}

impl SessionEvent {
    /// The session carried by the event, `None` once it is gone.
    pub fn session(&self) -> Option<&IdentitySession> {
        match self {
            SessionEvent::SignedIn(s) | SessionEvent::TokenRefreshed(s) => Some(s),
            SessionEvent::SignedOut => None,
        }
    }
}
