//! Identity records (sign-in credentials and role claims).

use chrono::{DateTime, Utc};

use storecast_core::{Email, ProfileId};

use super::SessionIdentity;

/// An authentication identity.
///
/// Holds the credential and the two role claim namespaces. The profile with
/// the same id holds the application role.
#[derive(Clone)]
pub struct Identity {
    pub id: ProfileId,
    pub email: Email,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub user_role_claim: Option<String>,
    pub app_role_claim: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Snapshot of this identity for the session.
    #[must_use]
    pub fn to_session(&self) -> SessionIdentity {
        SessionIdentity {
            id: self.id,
            email: self.email.clone(),
            user_role: self.user_role_claim.clone(),
            app_role: self.app_role_claim.clone(),
        }
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("user_role_claim", &self.user_role_claim)
            .field("app_role_claim", &self.app_role_claim)
            .field("created_at", &self.created_at)
            .finish()
    }
}
