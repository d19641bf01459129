//! Profile domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storecast_core::{Email, ProfileId, Role};

use super::SessionIdentity;

/// Application-level user record holding the role.
///
/// Exactly one profile exists per identity and shares its id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: ProfileId,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a profile row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub id: ProfileId,
    pub email: Email,
    pub role: Role,
}

impl NewProfile {
    /// Build the in-memory profile used when the row cannot be persisted.
    #[must_use]
    pub fn synthetic(&self, now: DateTime<Utc>) -> Profile {
        Profile {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
            created_at: now,
        }
    }
}

/// The resolved caller of a request: session identity plus profile.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub identity: SessionIdentity,
    pub profile: Profile,
}

impl CurrentUser {
    #[must_use]
    pub const fn id(&self) -> ProfileId {
        self.profile.id
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.profile.role
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.profile.role.is_admin()
    }
}
