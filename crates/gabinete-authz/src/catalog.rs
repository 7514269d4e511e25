//! Loaded permission catalog: the roles and (resource, action) pairs the
//! backend knows about.

use std::collections::{BTreeSet, HashMap};

use gabinete_core::error::GabineteResult;
use gabinete_core::models::permission::Permission;
use gabinete_core::models::role::Role;
use gabinete_core::repository::{PermissionRepository, RoleRepository};
use tracing::debug;

/// Snapshot of static reference data. Reload to pick up changes.
#[derive(Debug, Clone, Default)]
pub struct PermissionCatalog {
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    role_index: HashMap<String, usize>,
}

impl PermissionCatalog {
    pub async fn load<R, G>(roles: &R, permissions: &G) -> GabineteResult<Self>
    where
        R: RoleRepository,
        G: PermissionRepository,
    {
        let (roles, permissions) = tokio::join!(roles.list(), permissions.list());
        let catalog = Self::from_parts(roles?, permissions?);
        debug!(
            roles = catalog.roles.len(),
            permissions = catalog.permissions.len(),
            "Permission catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_parts(roles: Vec<Role>, permissions: Vec<Permission>) -> Self {
        let role_index = roles
            .iter()
            .enumerate()
            .map(|(i, role)| (role.name.clone(), i))
            .collect();
        Self {
            roles,
            permissions,
            role_index,
        }
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn role(&self, name: &str) -> Option<&Role> {
        self.role_index.get(name).map(|&i| &self.roles[i])
    }

    pub fn permission(&self, resource: &str, action: &str) -> Option<&Permission> {
        self.permissions
            .iter()
            .find(|permission| permission.matches(resource, action))
    }

    /// Distinct resources, sorted.
    pub fn resources(&self) -> Vec<&str> {
        self.permissions
            .iter()
            .map(|p| p.resource.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Actions known for `resource`, sorted.
    pub fn actions(&self, resource: &str) -> Vec<&str> {
        self.permissions
            .iter()
            .filter(|p| p.resource == resource)
            .map(|p| p.action.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
