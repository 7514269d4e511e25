//! SurrealDB implementation of [`PermissionRepository`].

use chrono::{DateTime, Utc};
use gabinete_core::error::GabineteResult;
use gabinete_core::models::permission::{CreatePermission, Permission};
use gabinete_core::repository::PermissionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
pub(crate) struct PermissionRow {
    record_id: String,
    resource: String,
    action: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PermissionRow {
    pub(crate) fn try_into_permission(self) -> Result<Permission, DbError> {
        Ok(Permission {
            id: parse_uuid("permission", &self.record_id)?,
            resource: self.resource,
            action: self.action,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn into_permissions(rows: Vec<PermissionRow>) -> Result<Vec<Permission>, DbError> {
    rows.into_iter()
        .map(PermissionRow::try_into_permission)
        .collect()
}

/// SurrealDB implementation of the Permission repository.
#[derive(Clone)]
pub struct SurrealPermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PermissionRepository for SurrealPermissionRepository<C> {
    async fn create(&self, input: CreatePermission) -> GabineteResult<Permission> {
        let id = Uuid::new_v4();

        let result = self
            .db
            .query(
                "CREATE type::record('permission', $id) SET \
                 resource = $resource, action = $action, \
                 description = $description; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('permission', $id);",
            )
            .bind(("id", id.to_string()))
            .bind(("resource", input.resource))
            .bind(("action", input.action))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("permission", e))?;
        let rows: Vec<PermissionRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: id.to_string(),
        })?;

        Ok(row.try_into_permission()?)
    }

    async fn get_by_key(&self, resource: &str, action: &str) -> GabineteResult<Option<Permission>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE resource = $resource AND action = $action LIMIT 1",
            )
            .bind(("resource", resource.to_string()))
            .bind(("action", action.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(PermissionRow::try_into_permission)
            .transpose()?)
    }

    async fn list(&self) -> GabineteResult<Vec<Permission>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 ORDER BY resource ASC, action ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_permissions(rows)?)
    }

    async fn grant_to_role(&self, role_id: Uuid, permission_id: Uuid) -> GabineteResult<()> {
        let query = format!("RELATE role:`{role_id}` -> grants -> permission:`{permission_id}`;");

        let response = self.db.query(query).await.map_err(DbError::from)?;
        match response.check() {
            Ok(_) => Ok(()),
            // The unique (in, out) index rejects a second edge; the grant
            // already exists.
            Err(e) => match DbError::from_statement("grant", e) {
                DbError::Duplicate { .. } => Ok(()),
                other => Err(other.into()),
            },
        }
    }

    async fn revoke_from_role(&self, role_id: Uuid, permission_id: Uuid) -> GabineteResult<()> {
        self.db
            .query(
                "DELETE grants WHERE \
                 in = type::record('role', $role_id) AND \
                 out = type::record('permission', $perm_id)",
            )
            .bind(("role_id", role_id.to_string()))
            .bind(("perm_id", permission_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn get_role_permissions(&self, role_name: &str) -> GabineteResult<Vec<Permission>> {
        // role name -> role id -> permission ids -> permission records.
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE id IN (\
                     SELECT VALUE out FROM grants \
                     WHERE in IN (SELECT VALUE id FROM role WHERE name = $role)\
                 ) \
                 ORDER BY resource ASC, action ASC",
            )
            .bind(("role", role_name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_permissions(rows)?)
    }
}
