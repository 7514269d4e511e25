//! Profile domain model, the business record of an authenticated user.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GabineteError;

/// Approval state of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileStatus {
    /// Registered, waiting for an administrator.
    Pending,
    Active,
    Disabled,
}

impl ProfileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileStatus::Pending => "Pending",
            ProfileStatus::Active => "Active",
            ProfileStatus::Disabled => "Disabled",
        }
    }
}

impl fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileStatus {
    type Err = GabineteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ProfileStatus::Pending),
            "Active" => Ok(ProfileStatus::Active),
            "Disabled" => Ok(ProfileStatus::Disabled),
            other => Err(GabineteError::Validation {
                message: format!("unknown profile status: {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Same id as the identity provider's user.
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    /// Role name, resolved against the role catalog.
    pub role: String,
    pub status: ProfileStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_active(&self) -> bool {
        self.status == ProfileStatus::Active
    }
}

/// Registration input. New profiles always start as [`ProfileStatus::Pending`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
}

/// Administrative update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    /// `Some(Some(url))` = set, `Some(None)` = clear, `None` = no change.
    pub avatar_url: Option<Option<String>>,
    pub role: Option<String>,
    pub status: Option<ProfileStatus>,
}
