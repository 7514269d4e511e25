//! Database-specific error types and conversions.

use gabinete_core::error::GabineteError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed row: {0}")]
    Decode(String),

    #[error("Duplicate {entity}")]
    Duplicate { entity: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    /// Classify a statement error, recognising unique-index violations.
    pub(crate) fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if message.contains("already contains") || message.contains("already exists") {
            DbError::Duplicate {
                entity: entity.into(),
            }
        } else {
            DbError::Query(message)
        }
    }
}

impl From<DbError> for GabineteError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => GabineteError::NotFound { entity, id },
            DbError::Duplicate { entity } => GabineteError::AlreadyExists { entity },
            other => GabineteError::Database(other.to_string()),
        }
    }
}

pub(crate) fn parse_uuid(field: &str, raw: &str) -> Result<uuid::Uuid, DbError> {
    uuid::Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}
