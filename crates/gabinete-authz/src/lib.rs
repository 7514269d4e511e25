//! Gabinete Authz: turns an authenticated identity into authorization
//! decisions.
//!
//! - [`merge`] folds a role's baseline grants and a user's overrides
//!   into an [`EffectivePermissionSet`].
//! - [`PermissionResolver`] fetches both inputs from the stores.
//! - [`PermissionGate`] answers `can` / `can_any` / `can_all`.
//! - [`SessionHolder`] owns the authentication state machine and keeps
//!   the effective set in step with the identity provider.
//! - [`RouteGuard`] maps the current state to a navigation decision.

pub mod catalog;
pub mod config;
pub mod gate;
pub mod guard;
pub mod permissions;
pub mod resolver;
pub mod session;
pub mod state;

pub use catalog::PermissionCatalog;
pub use config::{AuthzConfig, OverrideFailurePolicy};
pub use gate::PermissionGate;
pub use guard::{RouteDecision, RouteGuard, RouteRequirement};
pub use permissions::{EffectivePermissionSet, merge};
pub use resolver::PermissionResolver;
pub use session::SessionHolder;
pub use state::{ApprovalState, AuthContext, AuthState};
