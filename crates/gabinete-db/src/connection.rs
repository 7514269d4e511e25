//! Access store handle: one migrated SurrealDB client plus the
//! repositories built on it.

use gabinete_core::error::GabineteResult;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;
use crate::repository::{
    SurrealCredentialRepository, SurrealPermissionRepository, SurrealProfileRepository,
    SurrealRoleRepository, SurrealUserOverrideRepository,
};
use crate::schema::run_migrations;
use crate::seed::{SeedReport, seed_default_catalog};

#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket address of the server, e.g. `127.0.0.1:8000`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "gabinete".into(),
            database: "access".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// A client bound to the configured namespace and database with the
/// schema at its latest version.
#[derive(Clone)]
pub struct DbManager<C: Connection = Client> {
    db: Surreal<C>,
}

impl DbManager<Client> {
    /// Connect to a remote server as root, then [`open`](Self::open) it.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(url = %config.url, "Connecting to SurrealDB");
        let db = Surreal::new::<Ws>(&config.url).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        Self::open(db, config).await
    }
}

impl<C: Connection> DbManager<C> {
    /// Select namespace and database on an established client and run
    /// pending migrations. Safe to call on an already migrated store.
    pub async fn open(db: Surreal<C>, config: &DbConfig) -> Result<Self, DbError> {
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;
        run_migrations(&db).await?;
        info!(
            namespace = %config.namespace,
            database = %config.database,
            "Access store ready"
        );
        Ok(Self { db })
    }

    pub fn client(&self) -> &Surreal<C> {
        &self.db
    }

    pub fn profiles(&self) -> SurrealProfileRepository<C> {
        SurrealProfileRepository::new(self.db.clone())
    }

    pub fn roles(&self) -> SurrealRoleRepository<C> {
        SurrealRoleRepository::new(self.db.clone())
    }

    pub fn permissions(&self) -> SurrealPermissionRepository<C> {
        SurrealPermissionRepository::new(self.db.clone())
    }

    pub fn overrides(&self) -> SurrealUserOverrideRepository<C> {
        SurrealUserOverrideRepository::new(self.db.clone())
    }

    pub fn credentials(&self) -> SurrealCredentialRepository<C> {
        SurrealCredentialRepository::new(self.db.clone())
    }

    /// Bootstrap the default roles and permissions.
    pub async fn seed_defaults(&self) -> GabineteResult<SeedReport> {
        seed_default_catalog(&self.db).await
    }
}
