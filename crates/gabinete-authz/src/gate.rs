//! Authorization gate: the read-only query surface over an effective
//! permission set.

use std::sync::Arc;

use crate::permissions::EffectivePermissionSet;

/// Answers permission checks for one snapshot of an effective set.
///
/// Every query is total: an unknown resource or action, an empty set or
/// a missing profile all answer `false`.
#[derive(Debug, Clone, Default)]
pub struct PermissionGate {
    permissions: Arc<EffectivePermissionSet>,
}

impl PermissionGate {
    pub fn new(permissions: Arc<EffectivePermissionSet>) -> Self {
        Self { permissions }
    }

    /// A gate that grants nothing.
    pub fn deny_all() -> Self {
        Self::default()
    }

    pub fn can(&self, resource: &str, action: &str) -> bool {
        self.permissions.contains(resource, action)
    }

    /// `true` if at least one check passes.
    pub fn can_any(&self, checks: &[(&str, &str)]) -> bool {
        checks.iter().any(|(resource, action)| self.can(resource, action))
    }

    /// `true` if every check passes, so an empty list is satisfied.
    pub fn can_all(&self, checks: &[(&str, &str)]) -> bool {
        checks.iter().all(|(resource, action)| self.can(resource, action))
    }

    pub fn permissions(&self) -> &EffectivePermissionSet {
        &self.permissions
    }
}
