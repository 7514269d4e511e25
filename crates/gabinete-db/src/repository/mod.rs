//! SurrealDB repository implementations.

mod credential;
mod permission;
mod profile;
mod role;
mod user_override;

pub use credential::SurrealCredentialRepository;
pub use permission::SurrealPermissionRepository;
pub use profile::SurrealProfileRepository;
pub use role::SurrealRoleRepository;
pub use user_override::SurrealUserOverrideRepository;
