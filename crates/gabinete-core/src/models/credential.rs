//! Password credential used by the local identity provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub user_id: Uuid,
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCredential {
    pub user_id: Uuid,
    pub email: String,
    /// Already-hashed password; hashing happens in the auth layer.
    pub password_hash: String,
}
