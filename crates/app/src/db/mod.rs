//! Database operations for Storecast `PostgreSQL`.
//!
//! ## Tables
//!
//! - `identities` - Sign-in credentials and role claims
//! - `profiles` - Application role per identity (same id)
//! - `stores` - Client-owned retail locations
//! - `content` - Scheduled media items, one store each
//! - `invites` - Single-use account invitations
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/app/migrations/` and run via:
//! ```bash
//! storecast migrate
//! ```

pub mod content;
pub mod identities;
pub mod invites;
pub mod profiles;
pub mod stores;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use storecast_core::ProfileId;

pub use content::{ContentRecords, ContentRepository};
pub use identities::{IdentityRecords, IdentityRepository, NewIdentity};
pub use invites::InviteRepository;
pub use profiles::{ClientSummary, ProfileRepository, ProfileStore};
pub use stores::StoreRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The access level does not permit the operation.
    #[error("access denied")]
    AccessDenied,
}

impl RepositoryError {
    /// Map unique and foreign-key violations to [`RepositoryError::Conflict`].
    pub(crate) fn from_write(e: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
        {
            return Self::Conflict(conflict.to_owned());
        }
        Self::Database(e)
    }
}

/// Data-access level for a profile operation.
///
/// `Owner` is the caller's own restricted access: it only reaches the caller's
/// row and cannot grant itself admin. `Service` is elevated access used when
/// the session claims admin intent and by admin tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Service,
    Owner(ProfileId),
}

impl Access {
    /// Returns true if this access level may touch the profile `id`.
    #[must_use]
    pub fn reaches(self, id: ProfileId) -> bool {
        match self {
            Self::Service => true,
            Self::Owner(owner) => owner == id,
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Parse an email column, reporting a bad value as data corruption.
pub(crate) fn parse_email(raw: &str) -> Result<storecast_core::Email, RepositoryError> {
    storecast_core::Email::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_reaches() {
        let me = ProfileId::generate();
        let other = ProfileId::generate();
        assert!(Access::Service.reaches(other));
        assert!(Access::Owner(me).reaches(me));
        assert!(!Access::Owner(me).reaches(other));
    }

    #[test]
    fn test_parse_email_corruption() {
        assert!(matches!(
            parse_email("broken"),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
