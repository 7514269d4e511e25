//! Permission resolver: computes a user's effective permission set from
//! the stores.

use gabinete_core::error::GabineteResult;
use gabinete_core::models::profile::Profile;
use gabinete_core::repository::{PermissionRepository, ProfileRepository, UserOverrideRepository};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{AuthzConfig, OverrideFailurePolicy};
use crate::permissions::{EffectivePermissionSet, merge};

/// Read-only resolver over the profile, role-permission and override
/// stores. It neither retries nor caches.
pub struct PermissionResolver<P, G, O> {
    profiles: P,
    permissions: G,
    overrides: O,
    config: AuthzConfig,
}

impl<P, G, O> PermissionResolver<P, G, O>
where
    P: ProfileRepository,
    G: PermissionRepository,
    O: UserOverrideRepository,
{
    pub fn new(profiles: P, permissions: G, overrides: O, config: AuthzConfig) -> Self {
        Self {
            profiles,
            permissions,
            overrides,
            config,
        }
    }

    pub async fn profile(&self, user_id: Uuid) -> GabineteResult<Option<Profile>> {
        self.profiles.get_by_id(user_id).await
    }

    /// Effective set for `user_id`. A user without a profile gets the
    /// empty set; store failures propagate.
    pub async fn resolve(&self, user_id: Uuid) -> GabineteResult<EffectivePermissionSet> {
        match self.profile(user_id).await? {
            Some(profile) => self.resolve_for_profile(&profile).await,
            None => {
                debug!(%user_id, "No profile; resolving to the empty set");
                Ok(EffectivePermissionSet::empty())
            }
        }
    }

    /// Effective set for an already-loaded profile.
    pub async fn resolve_for_profile(
        &self,
        profile: &Profile,
    ) -> GabineteResult<EffectivePermissionSet> {
        let (role_permissions, overrides) = tokio::join!(
            self.permissions.get_role_permissions(&profile.role),
            self.overrides.list_for_user(profile.id),
        );

        let role_permissions = role_permissions.inspect_err(|e| {
            warn!(user_id = %profile.id, role = %profile.role, error = %e, "Role permissions failed to load");
        })?;

        let overrides = match (overrides, self.config.override_failure) {
            (Ok(overrides), _) => overrides,
            (Err(e), OverrideFailurePolicy::Deny) => {
                warn!(user_id = %profile.id, error = %e, "Overrides failed to load");
                return Err(e);
            }
            (Err(e), OverrideFailurePolicy::RoleOnly) => {
                warn!(
                    user_id = %profile.id,
                    error = %e,
                    "Overrides failed to load; using the role baseline only"
                );
                Vec::new()
            }
        };

        let effective = merge(role_permissions, overrides);
        debug!(
            user_id = %profile.id,
            role = %profile.role,
            permissions = effective.len(),
            "Permissions resolved"
        );
        Ok(effective)
    }
}
