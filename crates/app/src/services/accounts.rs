//! Account administration: role switches and email changes.
//!
//! Each change is two steps without a shared transaction: the identity
//! update (primary) and the profile upsert (best effort).

use thiserror::Error;

use storecast_core::{Email, EmailError, ProfileId, Role};

use super::steps::{StepKind, StepLog};
use crate::db::{Access, IdentityRecords, ProfileStore, RepositoryError};
use crate::models::NewProfile;

/// Errors that stop an account change before any step runs.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("account not found")]
    NotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Account administration service.
pub struct AccountService<'a> {
    identities: &'a dyn IdentityRecords,
    profiles: &'a dyn ProfileStore,
}

impl<'a> AccountService<'a> {
    #[must_use]
    pub const fn new(identities: &'a dyn IdentityRecords, profiles: &'a dyn ProfileStore) -> Self {
        Self {
            identities,
            profiles,
        }
    }

    /// Set an account's role: app role claim first, then the profile.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if there is no such identity.
    #[tracing::instrument(skip(self), fields(profile_id = %id, role = %role))]
    pub async fn set_role(&self, id: ProfileId, role: Role) -> Result<StepLog, AccountError> {
        let identity = self
            .identities
            .find(id)
            .await?
            .ok_or(AccountError::NotFound)?;

        let mut log = StepLog::new("set_role");
        let claimed = log
            .record(
                "update_app_role_claim",
                StepKind::Primary,
                self.identities.set_app_role(id, role).await,
            )
            .is_some();

        if claimed {
            let profile = NewProfile {
                id,
                email: identity.email,
                role,
            };
            log.record(
                "upsert_profile",
                StepKind::BestEffort,
                self.profiles.upsert(&profile).await,
            );
        }

        Ok(log)
    }

    /// Change an account's email: identity first, then the profile.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidEmail` for a malformed address and
    /// `AccountError::NotFound` if there is no such identity.
    #[tracing::instrument(skip(self), fields(profile_id = %id))]
    pub async fn change_email(&self, id: ProfileId, email: &str) -> Result<StepLog, AccountError> {
        let email = Email::parse(email)?;
        let identity = self
            .identities
            .find(id)
            .await?
            .ok_or(AccountError::NotFound)?;

        let mut log = StepLog::new("change_email");
        let changed = log
            .record(
                "update_identity_email",
                StepKind::Primary,
                self.identities.set_email(id, &email).await,
            )
            .is_some();

        if changed {
            let role = match self.profiles.find(id, Access::Service).await {
                Ok(Some(profile)) => profile.role,
                _ => identity.to_session().intended_role(),
            };
            let profile = NewProfile { id, email, role };
            log.record(
                "upsert_profile",
                StepKind::BestEffort,
                self.profiles.upsert(&profile).await,
            );
        }

        Ok(log)
    }
}
