//! Invite domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storecast_core::{Email, InviteId, ProfileId, Role};

/// A single-use invitation to create an identity with a given role.
#[derive(Debug, Clone, Serialize)]
pub struct Invite {
    pub id: InviteId,
    pub email: Email,
    pub role: Role,
    #[serde(skip)]
    pub token: String,
    pub invited_by: Option<ProfileId>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl Invite {
    #[must_use]
    pub const fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Returns true if the invite has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Returns true if this invite can still be accepted.
    #[must_use]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.is_used() && !self.is_expired(now)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invite(used: bool, expires_in: Duration) -> Invite {
        let now = Utc::now();
        Invite {
            id: InviteId::generate(),
            email: Email::parse("new@shop.com").unwrap(),
            role: Role::Client,
            token: "tok".to_owned(),
            invited_by: None,
            created_at: now,
            expires_at: now + expires_in,
            used_at: used.then_some(now),
        }
    }

    #[test]
    fn test_validity() {
        let now = Utc::now();
        assert!(invite(false, Duration::hours(1)).is_valid(now));
        assert!(!invite(true, Duration::hours(1)).is_valid(now));
        assert!(!invite(false, Duration::hours(-1)).is_valid(now));
    }
}
