//! Schema definitions and migration runner for SurrealDB.
//!
//! Tables are SCHEMAFULL. UUIDs are stored as strings and enums as
//! strings with ASSERT constraints.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "access_core",
    sql: SCHEMA_V1,
}];

const SCHEMA_V1: &str = "\
-- Profiles: business record of an authenticated identity.
DEFINE TABLE profile SCHEMAFULL;
DEFINE FIELD email ON TABLE profile TYPE string;
DEFINE FIELD full_name ON TABLE profile TYPE string;
DEFINE FIELD phone ON TABLE profile TYPE option<string>;
DEFINE FIELD avatar_url ON TABLE profile TYPE option<string>;
DEFINE FIELD role ON TABLE profile TYPE string;
DEFINE FIELD status ON TABLE profile TYPE string \
    ASSERT $value IN ['Pending', 'Active', 'Disabled'];
DEFINE FIELD approved_by ON TABLE profile TYPE option<string>;
DEFINE FIELD approved_at ON TABLE profile TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE profile TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE profile TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_profile_email ON TABLE profile COLUMNS email UNIQUE;

-- Roles: named bundles of default grants.
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD display_name ON TABLE role TYPE string;
DEFINE FIELD description ON TABLE role TYPE string;
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_name ON TABLE role COLUMNS name UNIQUE;

-- Permissions: (resource, action) vocabulary.
DEFINE TABLE permission SCHEMAFULL;
DEFINE FIELD resource ON TABLE permission TYPE string;
DEFINE FIELD action ON TABLE permission TYPE string;
DEFINE FIELD description ON TABLE permission TYPE string;
DEFINE FIELD created_at ON TABLE permission TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE permission TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_permission_resource_action ON TABLE permission \
    COLUMNS resource, action UNIQUE;

-- Role -> Permission grants.
DEFINE TABLE grants TYPE RELATION SCHEMAFULL;
DEFINE INDEX idx_grants_pair ON TABLE grants COLUMNS in, out UNIQUE;

-- Per-user overrides; one row per (user, permission).
DEFINE TABLE user_permission_override SCHEMAFULL;
DEFINE FIELD user_id ON TABLE user_permission_override TYPE string;
DEFINE FIELD permission_id ON TABLE user_permission_override TYPE string;
DEFINE FIELD granted ON TABLE user_permission_override TYPE bool;
DEFINE FIELD created_at ON TABLE user_permission_override TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user_permission_override TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_override_user_permission ON TABLE user_permission_override \
    COLUMNS user_id, permission_id UNIQUE;

-- Password credentials for the local identity provider.
DEFINE TABLE credential SCHEMAFULL;
DEFINE FIELD email ON TABLE credential TYPE string;
DEFINE FIELD password_hash ON TABLE credential TYPE string;
DEFINE FIELD created_at ON TABLE credential TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_credential_email ON TABLE credential COLUMNS email UNIQUE;
";

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates the `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the recorded maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS
        .iter()
        .filter(|m| m.version > current_version)
    {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "recording v{} failed: {}",
                    migration.version, e,
                ))
            })?;
    }

    Ok(())
}

/// Raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
