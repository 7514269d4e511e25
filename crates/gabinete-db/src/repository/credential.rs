//! SurrealDB implementation of [`CredentialRepository`].

use chrono::{DateTime, Utc};
use gabinete_core::error::GabineteResult;
use gabinete_core::models::credential::{CreateCredential, Credential};
use gabinete_core::repository::CredentialRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct CredentialRow {
    record_id: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl CredentialRow {
    fn try_into_credential(self) -> Result<Credential, DbError> {
        Ok(Credential {
            user_id: parse_uuid("user", &self.record_id)?,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
        })
    }
}

/// Stores password hashes keyed by the identity's user id. Emails are
/// normalised to lowercase on both write and lookup.
#[derive(Clone)]
pub struct SurrealCredentialRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCredentialRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CredentialRepository for SurrealCredentialRepository<C> {
    async fn create(&self, input: CreateCredential) -> GabineteResult<Credential> {
        let id = input.user_id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('credential', $id) SET \
                 email = $email, password_hash = $password_hash; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('credential', $id);",
            )
            .bind(("id", id.clone()))
            .bind(("email", input.email.to_lowercase()))
            .bind(("password_hash", input.password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("credential", e))?;
        let rows: Vec<CredentialRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or(DbError::NotFound {
            entity: "credential".into(),
            id,
        })?;

        Ok(row.try_into_credential()?)
    }

    async fn get_by_email(&self, email: &str) -> GabineteResult<Option<Credential>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM credential \
                 WHERE email = $email LIMIT 1",
            )
            .bind(("email", email.to_lowercase()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CredentialRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(CredentialRow::try_into_credential)
            .transpose()?)
    }
}
