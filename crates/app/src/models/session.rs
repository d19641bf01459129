//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use storecast_core::{Email, ProfileId, Role};

/// Session-stored identity, a snapshot of the identity claims at sign-in.
///
/// Two claim namespaces are carried: `user_role` (legacy user metadata) and
/// `app_role` (authoritative app metadata). Either one saying admin counts as
/// admin intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// Identity id (also the profile id).
    pub id: ProfileId,
    /// Identity email address.
    pub email: Email,
    /// Legacy user-metadata role claim.
    pub user_role: Option<String>,
    /// App-metadata role claim.
    pub app_role: Option<String>,
}

impl SessionIdentity {
    /// True if either claim namespace marks this identity as an admin.
    #[must_use]
    pub fn claims_admin(&self) -> bool {
        [self.user_role.as_deref(), self.app_role.as_deref()]
            .into_iter()
            .flatten()
            .any(|claim| Role::from_claim(claim) == Some(Role::Admin))
    }

    /// The role a new profile for this identity should get.
    #[must_use]
    pub fn intended_role(&self) -> Role {
        if self.claims_admin() {
            Role::Admin
        } else {
            Role::Client
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the signed-in identity.
    pub const IDENTITY: &str = "identity";

    /// Prefix for the last filter fingerprint of a paginated view.
    pub const FILTER_PREFIX: &str = "filter:";
}
