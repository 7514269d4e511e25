//! Repository trait definitions for the access core's store boundary.
//!
//! All repository operations are async. Implementations decode backend
//! rows into the typed models of [`crate::models`] before returning;
//! loosely-typed rows never cross this boundary.

use uuid::Uuid;

use crate::error::GabineteResult;
use crate::models::{
    credential::{CreateCredential, Credential},
    permission::{CreatePermission, Permission},
    profile::{CreateProfile, Profile, UpdateProfile},
    role::{CreateRole, Role},
    user_override::{ResolvedOverride, SetUserOverride, UserPermissionOverride},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub trait ProfileRepository: Send + Sync {
    fn create(&self, input: CreateProfile) -> impl Future<Output = GabineteResult<Profile>> + Send;

    /// `Ok(None)` when no profile row exists for `id`; a missing profile
    /// is a legitimate state, not an error.
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = GabineteResult<Option<Profile>>> + Send;

    fn update(
        &self,
        id: Uuid,
        input: UpdateProfile,
    ) -> impl Future<Output = GabineteResult<Profile>> + Send;

    /// Mark a pending profile active and record who approved it.
    fn approve(
        &self,
        id: Uuid,
        approver_id: Uuid,
    ) -> impl Future<Output = GabineteResult<Profile>> + Send;

    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = GabineteResult<PaginatedResult<Profile>>> + Send;
}

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = GabineteResult<Role>> + Send;
    fn get_by_name(&self, name: &str) -> impl Future<Output = GabineteResult<Option<Role>>> + Send;
    fn list(&self) -> impl Future<Output = GabineteResult<Vec<Role>>> + Send;
}

pub trait PermissionRepository: Send + Sync {
    fn create(
        &self,
        input: CreatePermission,
    ) -> impl Future<Output = GabineteResult<Permission>> + Send;

    fn get_by_key(
        &self,
        resource: &str,
        action: &str,
    ) -> impl Future<Output = GabineteResult<Option<Permission>>> + Send;

    /// The full permission catalog, ordered by resource then action.
    fn list(&self) -> impl Future<Output = GabineteResult<Vec<Permission>>> + Send;

    /// Grant a permission to a role (creates a `grants` edge).
    fn grant_to_role(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = GabineteResult<()>> + Send;

    /// Revoke a permission from a role.
    fn revoke_from_role(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = GabineteResult<()>> + Send;

    /// All permissions granted to the role named `role_name`. An unknown
    /// role grants nothing.
    fn get_role_permissions(
        &self,
        role_name: &str,
    ) -> impl Future<Output = GabineteResult<Vec<Permission>>> + Send;
}

pub trait UserOverrideRepository: Send + Sync {
    /// Insert or replace the override for `(user_id, permission_id)`.
    fn set(
        &self,
        input: SetUserOverride,
    ) -> impl Future<Output = GabineteResult<UserPermissionOverride>> + Send;

    fn remove(
        &self,
        user_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = GabineteResult<()>> + Send;

    /// Every override for `user_id`, each paired with its permission.
    fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = GabineteResult<Vec<ResolvedOverride>>> + Send;
}

pub trait CredentialRepository: Send + Sync {
    fn create(
        &self,
        input: CreateCredential,
    ) -> impl Future<Output = GabineteResult<Credential>> + Send;

    fn get_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = GabineteResult<Option<Credential>>> + Send;
}
