//! SurrealDB implementation of [`ProfileRepository`].

use chrono::{DateTime, Utc};
use gabinete_core::error::GabineteResult;
use gabinete_core::models::profile::{CreateProfile, Profile, ProfileStatus, UpdateProfile};
use gabinete_core::repository::{PaginatedResult, Pagination, ProfileRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

const SELECT_ONE: &str = "SELECT meta::id(id) AS record_id, * \
     FROM type::record('profile', $id)";

#[derive(Debug, SurrealValue)]
struct ProfileRow {
    record_id: String,
    email: String,
    full_name: String,
    phone: Option<String>,
    avatar_url: Option<String>,
    role: String,
    status: String,
    approved_by: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn try_into_profile(self) -> Result<Profile, DbError> {
        let status = self
            .status
            .parse::<ProfileStatus>()
            .map_err(|e| DbError::Decode(e.to_string()))?;
        let approved_by = self
            .approved_by
            .as_deref()
            .map(|raw| parse_uuid("approver", raw))
            .transpose()?;
        Ok(Profile {
            id: parse_uuid("profile", &self.record_id)?,
            email: self.email,
            full_name: self.full_name,
            phone: self.phone,
            avatar_url: self.avatar_url,
            role: self.role,
            status,
            approved_by,
            approved_at: self.approved_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Profile repository.
#[derive(Clone)]
pub struct SurrealProfileRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProfileRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Take the trailing `SELECT_ONE` result of a write batch.
    fn single(rows: Vec<ProfileRow>, id: Uuid) -> Result<Profile, DbError> {
        rows.into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "profile".into(),
                id: id.to_string(),
            })?
            .try_into_profile()
    }
}

impl<C: Connection> ProfileRepository for SurrealProfileRepository<C> {
    async fn create(&self, input: CreateProfile) -> GabineteResult<Profile> {
        let result = self
            .db
            .query(format!(
                "CREATE type::record('profile', $id) SET \
                 email = $email, full_name = $full_name, phone = $phone, \
                 role = $role, status = 'Pending'; {SELECT_ONE};"
            ))
            .bind(("id", input.id.to_string()))
            .bind(("email", input.email))
            .bind(("full_name", input.full_name))
            .bind(("phone", input.phone))
            .bind(("role", input.role))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("profile", e))?;
        let rows: Vec<ProfileRow> = result.take(1).map_err(DbError::from)?;
        Ok(Self::single(rows, input.id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> GabineteResult<Option<Profile>> {
        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_profile()?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: Uuid, input: UpdateProfile) -> GabineteResult<Profile> {
        let mut sets = Vec::new();
        if input.full_name.is_some() {
            sets.push("full_name = $full_name");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.avatar_url.is_some() {
            sets.push("avatar_url = $avatar_url");
        }
        if input.role.is_some() {
            sets.push("role = $role");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        sets.push("updated_at = time::now()");

        // UPDATE on a missing record id is a no-op, so the trailing
        // SELECT comes back empty and maps to NotFound.
        let query = format!(
            "UPDATE type::record('profile', $id) SET {}; {SELECT_ONE};",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id.to_string()));
        if let Some(full_name) = input.full_name {
            builder = builder.bind(("full_name", full_name));
        }
        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(avatar_url) = input.avatar_url {
            builder = builder.bind(("avatar_url", avatar_url));
        }
        if let Some(role) = input.role {
            builder = builder.bind(("role", role));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("profile", e))?;
        let rows: Vec<ProfileRow> = result.take(1).map_err(DbError::from)?;
        Ok(Self::single(rows, id)?)
    }

    async fn approve(&self, id: Uuid, approver_id: Uuid) -> GabineteResult<Profile> {
        let result = self
            .db
            .query(format!(
                "UPDATE type::record('profile', $id) SET \
                 status = 'Active', approved_by = $approver, \
                 approved_at = time::now(), updated_at = time::now(); \
                 {SELECT_ONE};"
            ))
            .bind(("id", id.to_string()))
            .bind(("approver", approver_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("profile", e))?;
        let rows: Vec<ProfileRow> = result.take(1).map_err(DbError::from)?;
        Ok(Self::single(rows, id)?)
    }

    async fn list(&self, pagination: Pagination) -> GabineteResult<PaginatedResult<Profile>> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM profile GROUP ALL; \
                 SELECT meta::id(id) AS record_id, * FROM profile \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset;",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let rows: Vec<ProfileRow> = result.take(1).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(ProfileRow::try_into_profile)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
