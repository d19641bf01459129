//! Authentication service.
//!
//! Password sign-up, sign-in, password change, and invite acceptance against
//! the identity records.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};

use storecast_core::{Email, Role};

use crate::db::{IdentityRecords, NewIdentity, RepositoryError};
use crate::models::{Identity, Invite, SessionIdentity};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    identities: &'a dyn IdentityRecords,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(identities: &'a dyn IdentityRecords) -> Self {
        Self { identities }
    }

    /// Register a client with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn sign_up_client(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        self.create_identity(email, password, infer_role(None)).await
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let identity = self
            .identities
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &identity.password_hash)?;

        Ok(identity)
    }

    /// Change the signed-in identity's password. The profile is untouched.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordMismatch` if the confirmation differs.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    pub async fn change_password(
        &self,
        identity: &SessionIdentity,
        new_password: &str,
        confirm: &str,
    ) -> Result<(), AuthError> {
        if new_password != confirm {
            return Err(AuthError::PasswordMismatch);
        }
        validate_password(new_password)?;

        let hash = hash_password(new_password)?;
        self.identities
            .set_password_hash(identity.id, &hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::InvalidCredentials,
                other => AuthError::Repository(other),
            })
    }

    /// Create the identity for an invite. The caller marks the invite used.
    ///
    /// The new identity's claims carry the invited role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidInvite` if the invite is used or expired.
    pub async fn accept_invite(
        &self,
        invite: &Invite,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Identity, AuthError> {
        if !invite.is_valid(now) {
            return Err(AuthError::InvalidInvite);
        }
        validate_password(password)?;
        self.create_identity(invite.email.clone(), password, infer_role(Some(invite.role)))
            .await
    }

    async fn create_identity(
        &self,
        email: Email,
        password: &str,
        role: Role,
    ) -> Result<Identity, AuthError> {
        let password_hash = hash_password(password)?;
        let new = NewIdentity {
            email,
            password_hash,
            user_role_claim: Some(Role::Client.as_str().to_owned()),
            app_role_claim: role.is_admin().then(|| role.as_str().to_owned()),
        };

        self.identities.create(&new).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })
    }
}

/// Role for a lazily created profile: the invite's role if there is one,
/// otherwise client.
#[must_use]
pub fn infer_role(invite_role: Option<Role>) -> Role {
    invite_role.unwrap_or_default()
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::InMemoryIdentities;
    use chrono::Duration;
    use storecast_core::InviteId;

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let identities = InMemoryIdentities::default();
        let auth = AuthService::new(&identities);

        let created = auth
            .sign_up_client("New@Shop.com", "correct-horse")
            .await
            .unwrap();
        assert_eq!(created.user_role_claim.as_deref(), Some("client"));
        assert_eq!(created.app_role_claim, None);

        let signed_in = auth.sign_in("new@shop.com", "correct-horse").await.unwrap();
        assert_eq!(signed_in.id, created.id);
    }

    #[tokio::test]
    async fn test_sign_in_errors_are_indistinguishable() {
        let identities = InMemoryIdentities::default();
        let auth = AuthService::new(&identities);
        auth.sign_up_client("a@shop.com", "password1").await.unwrap();

        let wrong_password = auth.sign_in("a@shop.com", "password2").await.unwrap_err();
        let unknown_email = auth.sign_in("b@shop.com", "password1").await.unwrap_err();
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_duplicate_sign_up() {
        let identities = InMemoryIdentities::default();
        let auth = AuthService::new(&identities);
        auth.sign_up_client("a@shop.com", "password1").await.unwrap();
        let err = auth.sign_up_client("A@shop.com", "password1").await.unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let identities = InMemoryIdentities::default();
        let auth = AuthService::new(&identities);
        let err = auth.sign_up_client("a@shop.com", "short").await.unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));
    }

    #[tokio::test]
    async fn test_change_password() {
        let identities = InMemoryIdentities::default();
        let auth = AuthService::new(&identities);
        let identity = auth.sign_up_client("a@shop.com", "password1").await.unwrap();
        let session = identity.to_session();

        let mismatch = auth
            .change_password(&session, "password2", "password3")
            .await
            .unwrap_err();
        assert!(matches!(mismatch, AuthError::PasswordMismatch));

        auth.change_password(&session, "password2", "password2")
            .await
            .unwrap();
        assert!(auth.sign_in("a@shop.com", "password1").await.is_err());
        assert!(auth.sign_in("a@shop.com", "password2").await.is_ok());
    }

    fn invite(role: Role, expires_in: Duration) -> Invite {
        let now = Utc::now();
        Invite {
            id: InviteId::generate(),
            email: Email::parse("invited@shop.com").unwrap(),
            role,
            token: "t".to_owned(),
            invited_by: None,
            created_at: now,
            expires_at: now + expires_in,
            used_at: None,
        }
    }

    #[tokio::test]
    async fn test_accept_admin_invite_sets_app_claim() {
        let identities = InMemoryIdentities::default();
        let auth = AuthService::new(&identities);

        let identity = auth
            .accept_invite(&invite(Role::Admin, Duration::hours(1)), "password1", Utc::now())
            .await
            .unwrap();
        assert_eq!(identity.app_role_claim.as_deref(), Some("admin"));
        assert!(identity.to_session().claims_admin());
    }

    #[tokio::test]
    async fn test_accept_expired_invite() {
        let identities = InMemoryIdentities::default();
        let auth = AuthService::new(&identities);
        let err = auth
            .accept_invite(&invite(Role::Client, Duration::hours(-1)), "password1", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidInvite));
    }

    #[test]
    fn test_infer_role_defaults_to_client() {
        assert_eq!(infer_role(None), Role::Client);
        assert_eq!(infer_role(Some(Role::Admin)), Role::Admin);
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = AuthError::Repository(RepositoryError::NotFound);
        assert!(!err.user_message().contains("database"));
        assert_eq!(
            AuthError::PasswordMismatch.user_message(),
            "Passwords do not match"
        );
    }
}
