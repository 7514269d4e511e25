//! Route guard: maps the holder's state and a route's requirement to a
//! navigation decision.

use crate::state::{ApprovalState, AuthState};

/// What a route demands of the current identity once it is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteRequirement {
    /// Any active identity.
    Authenticated,
    Permission { resource: String, action: String },
    AnyOf(Vec<(String, String)>),
    /// Every listed permission. An empty list is always satisfied.
    AllOf(Vec<(String, String)>),
}

impl RouteRequirement {
    pub fn permission(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self::Permission {
            resource: resource.into(),
            action: action.into(),
        }
    }

    pub fn any_of(checks: &[(&str, &str)]) -> Self {
        Self::AnyOf(owned(checks))
    }

    pub fn all_of(checks: &[(&str, &str)]) -> Self {
        Self::AllOf(owned(checks))
    }
}

fn owned(checks: &[(&str, &str)]) -> Vec<(String, String)> {
    checks
        .iter()
        .map(|(resource, action)| ((*resource).to_owned(), (*action).to_owned()))
        .collect()
}

fn borrowed(checks: &[(String, String)]) -> Vec<(&str, &str)> {
    checks
        .iter()
        .map(|(resource, action)| (resource.as_str(), action.as_str()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    /// No decision yet; render a loading indicator.
    Wait,
    RedirectToLogin,
    PendingApproval,
    AccountDisabled,
    Forbidden,
}

/// Stateless route guard.
pub struct RouteGuard;

impl RouteGuard {
    pub fn evaluate(state: &AuthState, requirement: &RouteRequirement) -> RouteDecision {
        let ctx = match state {
            AuthState::Uninitialized | AuthState::Loading => return RouteDecision::Wait,
            AuthState::Anonymous => return RouteDecision::RedirectToLogin,
            AuthState::Authenticated(ctx) => ctx,
        };

        match ctx.approval() {
            ApprovalState::PendingApproval => return RouteDecision::PendingApproval,
            ApprovalState::Disabled => return RouteDecision::AccountDisabled,
            ApprovalState::Active => {}
        }

        let gate = ctx.gate();
        let allowed = match requirement {
            RouteRequirement::Authenticated => true,
            RouteRequirement::Permission { resource, action } => gate.can(resource, action),
            RouteRequirement::AnyOf(checks) => gate.can_any(&borrowed(checks)),
            RouteRequirement::AllOf(checks) => gate.can_all(&borrowed(checks)),
        };

        if allowed {
            RouteDecision::Allow
        } else {
            RouteDecision::Forbidden
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use gabinete_core::catalog::{action, resource};
    use gabinete_core::models::permission::Permission;
    use gabinete_core::models::profile::{Profile, ProfileStatus};
    use gabinete_core::models::session::IdentitySession;
    use uuid::Uuid;

    use super::*;
    use crate::state::AuthContext;

    fn authenticated(status: Option<ProfileStatus>, keys: &[(&str, &str)]) -> AuthState {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let profile = status.map(|status| Profile {
            id: user_id,
            email: "assessor@gabinete.test".into(),
            full_name: "Assessor".into(),
            phone: None,
            avatar_url: None,
            role: "assessor".into(),
            status,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        });
        let permissions = keys
            .iter()
            .map(|(resource, action)| Permission {
                id: Uuid::new_v4(),
                resource: (*resource).into(),
                action: (*action).into(),
                description: String::new(),
                created_at: now,
                updated_at: now,
            })
            .collect();

        AuthState::Authenticated(AuthContext {
            session: IdentitySession {
                user_id,
                email: "assessor@gabinete.test".into(),
                access_token: "token".into(),
                expires_at: now + Duration::hours(1),
            },
            profile,
            permissions: Arc::new(permissions),
        })
    }

    #[test]
    fn undecided_states_wait() {
        let req = RouteRequirement::Authenticated;
        assert_eq!(RouteGuard::evaluate(&AuthState::Uninitialized, &req), RouteDecision::Wait);
        assert_eq!(RouteGuard::evaluate(&AuthState::Loading, &req), RouteDecision::Wait);
    }

    #[test]
    fn anonymous_is_sent_to_login() {
        assert_eq!(
            RouteGuard::evaluate(&AuthState::Anonymous, &RouteRequirement::Authenticated),
            RouteDecision::RedirectToLogin
        );
    }

    #[test]
    fn approval_comes_before_permissions() {
        let req = RouteRequirement::permission(resource::AGENDA, action::VIEW);
        let grants = [(resource::AGENDA, action::VIEW)];

        let pending = authenticated(Some(ProfileStatus::Pending), &grants);
        assert_eq!(RouteGuard::evaluate(&pending, &req), RouteDecision::PendingApproval);

        let missing = authenticated(None, &grants);
        assert_eq!(RouteGuard::evaluate(&missing, &req), RouteDecision::PendingApproval);

        let disabled = authenticated(Some(ProfileStatus::Disabled), &grants);
        assert_eq!(RouteGuard::evaluate(&disabled, &req), RouteDecision::AccountDisabled);
    }

    #[test]
    fn active_identity_is_checked_against_the_requirement() {
        let state = authenticated(
            Some(ProfileStatus::Active),
            &[(resource::AGENDA, action::VIEW), (resource::AGENDA, action::CREATE)],
        );

        assert_eq!(
            RouteGuard::evaluate(&state, &RouteRequirement::Authenticated),
            RouteDecision::Allow
        );
        assert_eq!(
            RouteGuard::evaluate(&state, &RouteRequirement::permission("agenda", "view")),
            RouteDecision::Allow
        );
        assert_eq!(
            RouteGuard::evaluate(&state, &RouteRequirement::permission("financial", "view")),
            RouteDecision::Forbidden
        );
        assert_eq!(
            RouteGuard::evaluate(
                &state,
                &RouteRequirement::any_of(&[("financial", "view"), ("agenda", "create")])
            ),
            RouteDecision::Allow
        );
        assert_eq!(
            RouteGuard::evaluate(
                &state,
                &RouteRequirement::all_of(&[("agenda", "view"), ("agenda", "delete")])
            ),
            RouteDecision::Forbidden
        );
        assert_eq!(
            RouteGuard::evaluate(&state, &RouteRequirement::all_of(&[])),
            RouteDecision::Allow
        );
    }
}
