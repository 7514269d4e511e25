//! Authorization configuration.

/// What the resolver does when the role grants load but the user's
/// overrides do not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverrideFailurePolicy {
    /// Fail the whole resolution.
    #[default]
    Deny,
    /// Fall back to the role baseline and log a warning. A revoke that
    /// could not be read is then not applied.
    RoleOnly,
}

/// Configuration for [`crate::PermissionResolver`].
#[derive(Debug, Clone, Default)]
pub struct AuthzConfig {
    pub override_failure: OverrideFailurePolicy,
}
