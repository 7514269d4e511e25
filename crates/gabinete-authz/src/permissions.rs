//! Effective permission sets and the role/override merge.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};

use gabinete_core::models::permission::Permission;
use gabinete_core::models::user_override::ResolvedOverride;
use uuid::Uuid;

/// The permissions actually available to one user, keyed by permission
/// id and indexed by resource, then action, for constant-time checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePermissionSet {
    by_id: BTreeMap<Uuid, Permission>,
    index: HashMap<String, HashSet<String>>,
}

impl EffectivePermissionSet {
    /// The set that grants nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_map(by_id: BTreeMap<Uuid, Permission>) -> Self {
        let mut index: HashMap<String, HashSet<String>> = HashMap::new();
        for permission in by_id.values() {
            index
                .entry(permission.resource.clone())
                .or_default()
                .insert(permission.action.clone());
        }
        Self { by_id, index }
    }

    /// Exact match on both `resource` and `action`.
    pub fn contains(&self, resource: &str, action: &str) -> bool {
        self.index
            .get(resource)
            .is_some_and(|actions| actions.contains(action))
    }

    pub fn contains_id(&self, id: Uuid) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.by_id.values()
    }

    /// Sorted `resource:action` keys.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.by_id.values().map(Permission::key).collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

impl FromIterator<Permission> for EffectivePermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self::from_map(iter.into_iter().map(|p| (p.id, p)).collect())
    }
}

/// Reduce overrides to one decision per permission id: the most
/// recently updated row wins, and a timestamp tie resolves to revoke.
fn collapse(overrides: impl IntoIterator<Item = ResolvedOverride>) -> HashMap<Uuid, ResolvedOverride> {
    let mut decisions: HashMap<Uuid, ResolvedOverride> = HashMap::new();
    for candidate in overrides {
        match decisions.entry(candidate.permission.id) {
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get_mut();
                if candidate.updated_at > current.updated_at {
                    *current = candidate;
                } else if candidate.updated_at == current.updated_at {
                    current.granted &= candidate.granted;
                }
            }
        }
    }
    decisions
}

/// Merge a role's baseline with a user's overrides.
///
/// Overrides take precedence over the role regardless of order: a grant
/// inserts the permission, a revoke removes it, both idempotently.
pub fn merge(
    role_permissions: impl IntoIterator<Item = Permission>,
    overrides: impl IntoIterator<Item = ResolvedOverride>,
) -> EffectivePermissionSet {
    let mut by_id: BTreeMap<Uuid, Permission> = role_permissions
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    for decision in collapse(overrides).into_values() {
        if decision.granted {
            by_id.insert(decision.permission.id, decision.permission);
        } else {
            by_id.remove(&decision.permission.id);
        }
    }

    EffectivePermissionSet::from_map(by_id)
}
