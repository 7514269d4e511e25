//! Observable authentication state.

use std::sync::Arc;

use gabinete_core::models::profile::{Profile, ProfileStatus};
use gabinete_core::models::session::IdentitySession;

use crate::gate::PermissionGate;
use crate::permissions::EffectivePermissionSet;

/// Approval sub-state of an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    /// Pending profile, or no profile provisioned yet.
    PendingApproval,
    Disabled,
    Active,
}

/// Everything known about an authenticated identity. Profile and
/// permissions are loaded before a context is ever published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub session: IdentitySession,
    /// `None` when the profile is missing or failed to load.
    pub profile: Option<Profile>,
    pub permissions: Arc<EffectivePermissionSet>,
}

impl AuthContext {
    pub fn approval(&self) -> ApprovalState {
        match self.profile.as_ref().map(|p| p.status) {
            Some(ProfileStatus::Active) => ApprovalState::Active,
            Some(ProfileStatus::Disabled) => ApprovalState::Disabled,
            Some(ProfileStatus::Pending) | None => ApprovalState::PendingApproval,
        }
    }

    /// Gate over this context. Without a profile nothing is granted.
    pub fn gate(&self) -> PermissionGate {
        match self.profile {
            Some(_) => PermissionGate::new(self.permissions.clone()),
            None => PermissionGate::deny_all(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Uninitialized,
    Loading,
    Anonymous,
    Authenticated(AuthContext),
}

impl AuthState {
    /// `false` while the holder has not reached a decision yet.
    pub fn is_settled(&self) -> bool {
        matches!(self, AuthState::Anonymous | AuthState::Authenticated(_))
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn context(&self) -> Option<&AuthContext> {
        match self {
            AuthState::Authenticated(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.context().and_then(|ctx| ctx.profile.as_ref())
    }

    pub fn gate(&self) -> PermissionGate {
        self.context()
            .map(AuthContext::gate)
            .unwrap_or_else(PermissionGate::deny_all)
    }
}
