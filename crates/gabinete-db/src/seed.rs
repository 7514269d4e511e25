//! Idempotent bootstrap of the default role and permission catalog.

use gabinete_core::catalog::{action, resource, role};
use gabinete_core::error::GabineteResult;
use gabinete_core::models::permission::CreatePermission;
use gabinete_core::models::role::CreateRole;
use gabinete_core::repository::{PermissionRepository, RoleRepository};
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::repository::{SurrealPermissionRepository, SurrealRoleRepository};

/// Counts of records created by [`seed_default_catalog`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub roles_created: usize,
    pub permissions_created: usize,
}

struct RoleSeed {
    name: &'static str,
    display_name: &'static str,
    description: &'static str,
    grants: fn(&str, &str) -> bool,
}

const ROLES: &[RoleSeed] = &[
    RoleSeed {
        name: role::ADMIN,
        display_name: "Administrador",
        description: "Full access, including user and settings management",
        grants: |_, _| true,
    },
    RoleSeed {
        name: role::CHEFE_GABINETE,
        display_name: "Chefe de Gabinete",
        description: "Runs the office; cannot manage users or settings",
        grants: |res, act| !(act == action::MANAGE && (res == resource::USERS || res == resource::SETTINGS)),
    },
    RoleSeed {
        name: role::ASSESSOR,
        display_name: "Assessor",
        description: "Schedules agenda items and files documents",
        grants: |res, act| match res {
            resource::AGENDA => matches!(act, action::VIEW | action::CREATE | action::EDIT),
            resource::DOCUMENTS => matches!(act, action::VIEW | action::CREATE),
            resource::FINANCIAL | resource::REPORTS => act == action::VIEW,
            _ => false,
        },
    },
    RoleSeed {
        name: role::EQUIPE,
        display_name: "Equipe",
        description: "Read-only access to the agenda and documents",
        grants: |res, act| act == action::VIEW && (res == resource::AGENDA || res == resource::DOCUMENTS),
    },
];

/// Create every known `(resource, action)` permission and the default
/// roles with their grants. Existing rows are reused, so the call is
/// safe to repeat.
pub async fn seed_default_catalog<C: Connection>(db: &Surreal<C>) -> GabineteResult<SeedReport> {
    let roles = SurrealRoleRepository::new(db.clone());
    let permissions = SurrealPermissionRepository::new(db.clone());
    let mut report = SeedReport::default();

    let mut catalog = Vec::with_capacity(resource::ALL.len() * action::ALL.len());
    for res in resource::ALL {
        for act in action::ALL {
            let permission = match permissions.get_by_key(res, act).await? {
                Some(existing) => existing,
                None => {
                    report.permissions_created += 1;
                    permissions
                        .create(CreatePermission {
                            resource: (*res).into(),
                            action: (*act).into(),
                            description: format!("{act} {res}"),
                        })
                        .await?
                }
            };
            catalog.push(permission);
        }
    }

    for seed in ROLES {
        let role = match roles.get_by_name(seed.name).await? {
            Some(existing) => existing,
            None => {
                report.roles_created += 1;
                roles
                    .create(CreateRole {
                        name: seed.name.into(),
                        display_name: seed.display_name.into(),
                        description: seed.description.into(),
                    })
                    .await?
            }
        };

        for permission in catalog
            .iter()
            .filter(|p| (seed.grants)(&p.resource, &p.action))
        {
            permissions.grant_to_role(role.id, permission.id).await?;
        }
    }

    info!(
        roles_created = report.roles_created,
        permissions_created = report.permissions_created,
        "Default catalog seeded"
    );

    Ok(report)
}
