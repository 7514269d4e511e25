//! SurrealDB implementation of [`RoleRepository`].

use chrono::{DateTime, Utc};
use gabinete_core::error::GabineteResult;
use gabinete_core::models::role::{CreateRole, Role};
use gabinete_core::repository::RoleRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct RoleRow {
    record_id: String,
    name: String,
    display_name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRow {
    fn try_into_role(self) -> Result<Role, DbError> {
        Ok(Role {
            id: parse_uuid("role", &self.record_id)?,
            name: self.name,
            display_name: self.display_name,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Role repository.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn create(&self, input: CreateRole) -> GabineteResult<Role> {
        let id = Uuid::new_v4();

        let result = self
            .db
            .query(
                "CREATE type::record('role', $id) SET \
                 name = $name, display_name = $display_name, \
                 description = $description; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('role', $id);",
            )
            .bind(("id", id.to_string()))
            .bind(("name", input.name))
            .bind(("display_name", input.display_name))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("role", e))?;
        let rows: Vec<RoleRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id.to_string(),
        })?;

        Ok(row.try_into_role()?)
    }

    async fn get_by_name(&self, name: &str) -> GabineteResult<Option<Role>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 WHERE name = $name LIMIT 1",
            )
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(RoleRow::try_into_role)
            .transpose()?)
    }

    async fn list(&self) -> GabineteResult<Vec<Role>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM role ORDER BY name ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let roles = rows
            .into_iter()
            .map(RoleRow::try_into_role)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(roles)
    }
}
