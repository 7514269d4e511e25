//! Permission domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single grantable capability, unique by `(resource, action)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    /// Module under access control (e.g. `agenda`, `financial`).
    pub resource: String,
    /// Operation on the resource (e.g. `view`, `approve`).
    pub action: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    /// Index key in `resource:action` form.
    pub fn key(&self) -> String {
        permission_key(&self.resource, &self.action)
    }

    pub fn matches(&self, resource: &str, action: &str) -> bool {
        self.resource == resource && self.action == action
    }
}

/// Builds the `resource:action` key used by permission indexes.
pub fn permission_key(resource: &str, action: &str) -> String {
    format!("{resource}:{action}")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermission {
    pub resource: String,
    pub action: String,
    pub description: String,
}
