//! Per-user permission overrides.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permission::Permission;

/// Force-grant (`granted = true`) or force-revoke (`granted = false`) of
/// one permission for one user, regardless of the user's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissionOverride {
    pub user_id: Uuid,
    pub permission_id: Uuid,
    pub granted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert input; at most one override exists per `(user_id, permission_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetUserOverride {
    pub user_id: Uuid,
    pub permission_id: Uuid,
    pub granted: bool,
}

/// An override joined with the permission record it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOverride {
    pub permission: Permission,
    pub granted: bool,
    pub updated_at: DateTime<Utc>,
}
