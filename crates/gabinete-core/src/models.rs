//! Domain models for the access core.

pub mod credential;
pub mod permission;
pub mod profile;
pub mod role;
pub mod session;
pub mod user_override;
