//! SurrealDB implementation of [`UserOverrideRepository`].
//!
//! Each override lives at the record key `<user_id>_<permission_id>`,
//! so a second `set` for the same pair replaces the first instead of
//! adding a duplicate row.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use gabinete_core::error::GabineteResult;
use gabinete_core::models::user_override::{
    ResolvedOverride, SetUserOverride, UserPermissionOverride,
};
use gabinete_core::repository::UserOverrideRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::warn;
use uuid::Uuid;

use super::permission::PermissionRow;
use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct OverrideRow {
    user_id: String,
    permission_id: String,
    granted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OverrideRow {
    fn try_into_override(self) -> Result<UserPermissionOverride, DbError> {
        Ok(UserPermissionOverride {
            user_id: parse_uuid("user", &self.user_id)?,
            permission_id: parse_uuid("permission", &self.permission_id)?,
            granted: self.granted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn record_key(user_id: Uuid, permission_id: Uuid) -> String {
    format!("{user_id}_{permission_id}")
}

/// SurrealDB implementation of the user override repository.
#[derive(Clone)]
pub struct SurrealUserOverrideRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserOverrideRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserOverrideRepository for SurrealUserOverrideRepository<C> {
    async fn set(&self, input: SetUserOverride) -> GabineteResult<UserPermissionOverride> {
        let key = record_key(input.user_id, input.permission_id);

        let result = self
            .db
            .query(
                "UPSERT type::record('user_permission_override', $key) SET \
                 user_id = $user_id, permission_id = $permission_id, \
                 granted = $granted, updated_at = time::now(); \
                 SELECT user_id, permission_id, granted, created_at, updated_at \
                 FROM type::record('user_permission_override', $key);",
            )
            .bind(("key", key.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("permission_id", input.permission_id.to_string()))
            .bind(("granted", input.granted))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("user_permission_override", e))?;
        let rows: Vec<OverrideRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user_permission_override".into(),
            id: key,
        })?;

        Ok(row.try_into_override()?)
    }

    async fn remove(&self, user_id: Uuid, permission_id: Uuid) -> GabineteResult<()> {
        self.db
            .query("DELETE type::record('user_permission_override', $key)")
            .bind(("key", record_key(user_id, permission_id)))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> GabineteResult<Vec<ResolvedOverride>> {
        let mut result = self
            .db
            .query(
                "SELECT user_id, permission_id, granted, created_at, updated_at \
                 FROM user_permission_override \
                 WHERE user_id = $user_id \
                 ORDER BY updated_at ASC; \
                 SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE meta::id(id) IN (\
                     SELECT VALUE permission_id FROM user_permission_override \
                     WHERE user_id = $user_id\
                 );",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let overrides: Vec<OverrideRow> = result.take(0).map_err(DbError::from)?;
        let permissions: Vec<PermissionRow> = result.take(1).map_err(DbError::from)?;

        let mut by_id = HashMap::with_capacity(permissions.len());
        for row in permissions {
            let permission = row.try_into_permission()?;
            by_id.insert(permission.id, permission);
        }

        let mut resolved = Vec::with_capacity(overrides.len());
        for row in overrides {
            let row = row.try_into_override()?;
            match by_id.get(&row.permission_id) {
                Some(permission) => resolved.push(ResolvedOverride {
                    permission: permission.clone(),
                    granted: row.granted,
                    updated_at: row.updated_at,
                }),
                None => warn!(
                    %user_id,
                    permission_id = %row.permission_id,
                    "Skipping override for a permission that no longer exists"
                ),
            }
        }

        Ok(resolved)
    }
}
