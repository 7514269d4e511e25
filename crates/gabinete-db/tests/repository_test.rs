//! Integration tests for the SurrealDB repositories using an in-memory
//! engine.

use gabinete_core::error::GabineteError;
use gabinete_core::models::credential::CreateCredential;
use gabinete_core::models::permission::CreatePermission;
use gabinete_core::models::profile::{CreateProfile, ProfileStatus, UpdateProfile};
use gabinete_core::models::role::CreateRole;
use gabinete_core::models::user_override::SetUserOverride;
use gabinete_core::repository::{
    CredentialRepository, Pagination, PermissionRepository, ProfileRepository, RoleRepository,
    UserOverrideRepository,
};
use gabinete_db::repository::{
    SurrealCredentialRepository, SurrealPermissionRepository, SurrealProfileRepository,
    SurrealRoleRepository, SurrealUserOverrideRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    gabinete_db::run_migrations(&db).await.unwrap();
    db
}

fn new_profile(email: &str, role: &str) -> CreateProfile {
    CreateProfile {
        id: Uuid::new_v4(),
        email: email.into(),
        full_name: "Maria Souza".into(),
        phone: Some("+55 61 99999-0000".into()),
        role: role.into(),
    }
}

async fn permission(
    repo: &SurrealPermissionRepository<Db>,
    resource: &str,
    action: &str,
) -> gabinete_core::models::permission::Permission {
    repo.create(CreatePermission {
        resource: resource.into(),
        action: action.into(),
        description: format!("{action} {resource}"),
    })
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Migrations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = setup().await;
    gabinete_db::run_migrations(&db).await.unwrap();
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_profiles_start_pending() {
    let repo = SurrealProfileRepository::new(setup().await);
    let input = new_profile("maria@camara.leg.br", "assessor");
    let id = input.id;

    let profile = repo.create(input).await.unwrap();
    assert_eq!(profile.id, id);
    assert_eq!(profile.status, ProfileStatus::Pending);
    assert_eq!(profile.role, "assessor");
    assert!(profile.approved_by.is_none());

    let fetched = repo.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(fetched, profile);
}

#[tokio::test]
async fn missing_profile_is_none_not_error() {
    let repo = SurrealProfileRepository::new(setup().await);
    assert!(repo.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let repo = SurrealProfileRepository::new(setup().await);
    repo.create(new_profile("dup@camara.leg.br", "equipe"))
        .await
        .unwrap();

    let err = repo
        .create(new_profile("dup@camara.leg.br", "equipe"))
        .await
        .unwrap_err();
    assert!(matches!(err, GabineteError::AlreadyExists { .. }));
}

#[tokio::test]
async fn approve_activates_and_records_approver() {
    let repo = SurrealProfileRepository::new(setup().await);
    let profile = repo
        .create(new_profile("novo@camara.leg.br", "equipe"))
        .await
        .unwrap();
    let admin = Uuid::new_v4();

    let approved = repo.approve(profile.id, admin).await.unwrap();
    assert_eq!(approved.status, ProfileStatus::Active);
    assert_eq!(approved.approved_by, Some(admin));
    assert!(approved.approved_at.is_some());
}

#[tokio::test]
async fn update_changes_only_given_fields() {
    let repo = SurrealProfileRepository::new(setup().await);
    let profile = repo
        .create(new_profile("joao@camara.leg.br", "equipe"))
        .await
        .unwrap();

    let updated = repo
        .update(
            profile.id,
            UpdateProfile {
                role: Some("assessor".into()),
                status: Some(ProfileStatus::Disabled),
                avatar_url: Some(Some("https://cdn.example/joao.png".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.role, "assessor");
    assert_eq!(updated.status, ProfileStatus::Disabled);
    assert_eq!(updated.avatar_url.as_deref(), Some("https://cdn.example/joao.png"));
    assert_eq!(updated.full_name, profile.full_name);
    assert_eq!(updated.phone, profile.phone);
}

#[tokio::test]
async fn update_missing_profile_is_not_found() {
    let repo = SurrealProfileRepository::new(setup().await);
    let err = repo
        .update(Uuid::new_v4(), UpdateProfile::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GabineteError::NotFound { .. }));
}

#[tokio::test]
async fn list_profiles_paginates() {
    let repo = SurrealProfileRepository::new(setup().await);
    for i in 0..3 {
        repo.create(new_profile(&format!("user{i}@camara.leg.br"), "equipe"))
            .await
            .unwrap();
    }

    let page = repo
        .list(Pagination {
            offset: 0,
            limit: 2,
        })
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
}

// ---------------------------------------------------------------------------
// Roles and permissions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn role_lookup_by_name() {
    let repo = SurrealRoleRepository::new(setup().await);
    let role = repo
        .create(CreateRole {
            name: "assessor".into(),
            display_name: "Assessor".into(),
            description: "Staff advisor".into(),
        })
        .await
        .unwrap();

    let fetched = repo.get_by_name("assessor").await.unwrap().unwrap();
    assert_eq!(fetched.id, role.id);
    assert_eq!(fetched.display_name, "Assessor");
    assert!(repo.get_by_name("missing").await.unwrap().is_none());
    assert_eq!(repo.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn permission_pair_is_unique() {
    let repo = SurrealPermissionRepository::new(setup().await);
    permission(&repo, "agenda", "view").await;

    let err = repo
        .create(CreatePermission {
            resource: "agenda".into(),
            action: "view".into(),
            description: "again".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GabineteError::AlreadyExists { .. }));

    let found = repo.get_by_key("agenda", "view").await.unwrap().unwrap();
    assert_eq!(found.key(), "agenda:view");
    assert!(repo.get_by_key("agenda", "approve").await.unwrap().is_none());
}

#[tokio::test]
async fn role_permissions_follow_grants() {
    let db = setup().await;
    let roles = SurrealRoleRepository::new(db.clone());
    let perms = SurrealPermissionRepository::new(db);

    let assessor = roles
        .create(CreateRole {
            name: "assessor".into(),
            display_name: "Assessor".into(),
            description: String::new(),
        })
        .await
        .unwrap();
    let view = permission(&perms, "agenda", "view").await;
    let create = permission(&perms, "agenda", "create").await;
    permission(&perms, "financial", "view").await;

    perms.grant_to_role(assessor.id, view.id).await.unwrap();
    perms.grant_to_role(assessor.id, create.id).await.unwrap();
    // A repeated grant does not duplicate the edge.
    perms.grant_to_role(assessor.id, view.id).await.unwrap();

    let granted = perms.get_role_permissions("assessor").await.unwrap();
    let keys: Vec<String> = granted.iter().map(|p| p.key()).collect();
    assert_eq!(keys, vec!["agenda:create", "agenda:view"]);

    perms.revoke_from_role(assessor.id, create.id).await.unwrap();
    let granted = perms.get_role_permissions("assessor").await.unwrap();
    assert_eq!(granted, vec![view]);

    assert!(perms.get_role_permissions("unknown").await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

#[tokio::test]
async fn override_set_is_upsert() {
    let db = setup().await;
    let perms = SurrealPermissionRepository::new(db.clone());
    let overrides = SurrealUserOverrideRepository::new(db);
    let approve = permission(&perms, "agenda", "approve").await;
    let user = Uuid::new_v4();

    let first = overrides
        .set(SetUserOverride {
            user_id: user,
            permission_id: approve.id,
            granted: true,
        })
        .await
        .unwrap();
    assert!(first.granted);

    let second = overrides
        .set(SetUserOverride {
            user_id: user,
            permission_id: approve.id,
            granted: false,
        })
        .await
        .unwrap();
    assert!(!second.granted);
    assert_eq!(second.created_at, first.created_at);

    let listed = overrides.list_for_user(user).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].permission, approve);
    assert!(!listed[0].granted);
}

#[tokio::test]
async fn overrides_are_scoped_to_user_and_removable() {
    let db = setup().await;
    let perms = SurrealPermissionRepository::new(db.clone());
    let overrides = SurrealUserOverrideRepository::new(db);
    let view = permission(&perms, "financial", "view").await;
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    for user in [alice, bob] {
        overrides
            .set(SetUserOverride {
                user_id: user,
                permission_id: view.id,
                granted: true,
            })
            .await
            .unwrap();
    }

    overrides.remove(alice, view.id).await.unwrap();
    assert!(overrides.list_for_user(alice).await.unwrap().is_empty());
    assert_eq!(overrides.list_for_user(bob).await.unwrap().len(), 1);
}

#[tokio::test]
async fn overrides_for_deleted_permissions_are_skipped() {
    let db = setup().await;
    let overrides = SurrealUserOverrideRepository::new(db);
    let user = Uuid::new_v4();

    overrides
        .set(SetUserOverride {
            user_id: user,
            permission_id: Uuid::new_v4(),
            granted: true,
        })
        .await
        .unwrap();

    assert!(overrides.list_for_user(user).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[tokio::test]
async fn credentials_lookup_is_case_insensitive() {
    let repo = SurrealCredentialRepository::new(setup().await);
    let user_id = Uuid::new_v4();
    repo.create(CreateCredential {
        user_id,
        email: "Chefe@Camara.leg.br".into(),
        password_hash: "$argon2id$stub".into(),
    })
    .await
    .unwrap();

    let found = repo
        .get_by_email("chefe@camara.leg.br")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.user_id, user_id);
    assert!(repo.get_by_email("other@camara.leg.br").await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn default_catalog_seed_is_repeatable() {
    let db = setup().await;

    let first = gabinete_db::seed_default_catalog(&db).await.unwrap();
    assert_eq!(first.roles_created, 4);
    assert_eq!(first.permissions_created, 42);

    let second = gabinete_db::seed_default_catalog(&db).await.unwrap();
    assert_eq!(second.roles_created, 0);
    assert_eq!(second.permissions_created, 0);

    let perms = SurrealPermissionRepository::new(db);
    assert_eq!(perms.get_role_permissions("admin").await.unwrap().len(), 42);
    let equipe: Vec<String> = perms
        .get_role_permissions("equipe")
        .await
        .unwrap()
        .iter()
        .map(|p| p.key())
        .collect();
    assert_eq!(equipe, vec!["agenda:view", "documents:view"]);
}

// ---------------------------------------------------------------------------
// Store handle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn manager_opens_a_migrated_store() {
    let config = gabinete_db::DbConfig::default();
    let client = Surreal::new::<Mem>(()).await.unwrap();
    let manager = gabinete_db::DbManager::open(client, &config).await.unwrap();

    let report = manager.seed_defaults().await.unwrap();
    assert_eq!(report.roles_created, 4);
    assert_eq!(manager.roles().list().await.unwrap().len(), 4);
    assert!(
        manager
            .permissions()
            .get_by_key("agenda", "approve")
            .await
            .unwrap()
            .is_some()
    );

    let profile = manager
        .profiles()
        .create(new_profile("ana@camara.leg.br", "equipe"))
        .await
        .unwrap();
    manager
        .credentials()
        .create(CreateCredential {
            user_id: profile.id,
            email: profile.email.clone(),
            password_hash: "$argon2id$stub".into(),
        })
        .await
        .unwrap();
    assert!(manager.overrides().list_for_user(profile.id).await.unwrap().is_empty());

    // Reopening the same client keeps data and does not re-run migrations.
    let reopened = gabinete_db::DbManager::open(manager.client().clone(), &config)
        .await
        .unwrap();
    assert_eq!(
        reopened.profiles().get_by_id(profile.id).await.unwrap(),
        Some(profile)
    );
}
