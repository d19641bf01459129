//! Role resolution for the current request.
//!
//! Turns the session identity into `{identity, profile}`. The profile is
//! created on first access; every data-store failure degrades instead of
//! failing the request.

use chrono::Utc;

use crate::db::{Access, ProfileStore};
use crate::models::{CurrentUser, NewProfile, Profile, SessionIdentity};

/// Access level used for a session's profile lookups.
///
/// Admin intent (either claim namespace) gets service access.
#[must_use]
pub fn access_for(identity: &SessionIdentity) -> Access {
    if identity.claims_admin() {
        Access::Service
    } else {
        Access::Owner(identity.id)
    }
}

/// Resolve the current user.
///
/// Returns `None` only when there is no session identity. A lookup error is
/// logged and treated as a missing profile. A missing profile is created
/// with the role implied by the claims; if that fails a synthetic,
/// unpersisted profile is returned so an authenticated caller always has one.
pub async fn resolve_current_user<P>(
    identity: Option<&SessionIdentity>,
    profiles: &P,
) -> Option<CurrentUser>
where
    P: ProfileStore + ?Sized,
{
    let identity = identity?;
    let access = access_for(identity);

    let existing = match profiles.find(identity.id, access).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!(
                profile_id = %identity.id,
                error = %e,
                "Profile lookup failed, treating as absent"
            );
            None
        }
    };

    let profile = match existing {
        Some(profile) => profile,
        None => create_profile(identity, profiles, access).await,
    };

    Some(CurrentUser {
        identity: identity.clone(),
        profile,
    })
}

async fn create_profile<P>(identity: &SessionIdentity, profiles: &P, access: Access) -> Profile
where
    P: ProfileStore + ?Sized,
{
    let new = NewProfile {
        id: identity.id,
        email: identity.email.clone(),
        role: identity.intended_role(),
    };

    match profiles.create(&new, access).await {
        Ok(profile) => {
            tracing::info!(profile_id = %profile.id, role = %profile.role, "Created profile");
            profile
        }
        Err(e) => {
            tracing::error!(
                profile_id = %identity.id,
                error = %e,
                "Profile creation failed, using unpersisted profile"
            );
            new.synthetic(Utc::now())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::InMemoryProfiles;
    use storecast_core::{Email, ProfileId, Role};

    fn identity(app_role: Option<&str>) -> SessionIdentity {
        SessionIdentity {
            id: ProfileId::generate(),
            email: Email::parse("owner@shop.com").unwrap(),
            user_role: Some("client".to_owned()),
            app_role: app_role.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn test_no_session_resolves_to_none() {
        let profiles = InMemoryProfiles::default();
        assert!(resolve_current_user(None, &profiles).await.is_none());
    }

    #[tokio::test]
    async fn test_creates_missing_client_profile() {
        let profiles = InMemoryProfiles::default();
        let session = identity(None);

        let user = resolve_current_user(Some(&session), &profiles).await.unwrap();
        assert_eq!(user.role(), Role::Client);
        assert_eq!(profiles.len(), 1);
    }

    #[tokio::test]
    async fn test_admin_claim_creates_admin_profile_with_service_access() {
        let profiles = InMemoryProfiles::default();
        let session = identity(Some("admin"));

        let user = resolve_current_user(Some(&session), &profiles).await.unwrap();
        assert!(user.is_admin());
        assert_eq!(profiles.len(), 1);
    }

    #[tokio::test]
    async fn test_existing_profile_role_wins() {
        let profiles = InMemoryProfiles::default();
        let session = identity(None);
        profiles.insert(session.id, &session.email, Role::Admin);

        let user = resolve_current_user(Some(&session), &profiles).await.unwrap();
        assert_eq!(user.role(), Role::Admin);
    }

    #[tokio::test]
    async fn test_lookup_and_create_failures_fall_back_to_synthetic() {
        let profiles = InMemoryProfiles::failing();
        let session = identity(Some("admin"));

        let user = resolve_current_user(Some(&session), &profiles).await.unwrap();
        assert_eq!(user.id(), session.id);
        assert_eq!(user.role(), Role::Admin);
        assert_eq!(profiles.len(), 0);
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let profiles = InMemoryProfiles::default();
        let session = identity(None);

        let first = resolve_current_user(Some(&session), &profiles).await.unwrap();
        let second = resolve_current_user(Some(&session), &profiles).await.unwrap();
        assert_eq!(first.role(), second.role());
        assert_eq!(first.profile, second.profile);
        assert_eq!(profiles.len(), 1);
    }
}
