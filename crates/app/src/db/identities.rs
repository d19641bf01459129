//! Identity repository: credentials and role claims.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use storecast_core::{Email, ProfileId, Role};

use super::{RepositoryError, parse_email};
use crate::models::Identity;

/// Fields for creating an identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: Email,
    pub password_hash: String,
    pub user_role_claim: Option<String>,
    pub app_role_claim: Option<String>,
}

/// Identity lookups and mutations used by the auth and account services.
#[async_trait]
pub trait IdentityRecords: Send + Sync {
    async fn find(&self, id: ProfileId) -> Result<Option<Identity>, RepositoryError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, RepositoryError>;

    /// Create an identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken.
    async fn create(&self, new: &NewIdentity) -> Result<Identity, RepositoryError>;

    /// Replace the password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the identity does not exist.
    async fn set_password_hash(&self, id: ProfileId, hash: &str) -> Result<(), RepositoryError>;

    /// Set the authoritative app role claim.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the identity does not exist.
    async fn set_app_role(&self, id: ProfileId, role: Role) -> Result<(), RepositoryError>;

    /// Change the sign-in email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the identity does not exist,
    /// `RepositoryError::Conflict` if the email is taken.
    async fn set_email(&self, id: ProfileId, email: &Email) -> Result<(), RepositoryError>;
}

/// Internal row type for database queries.
#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: ProfileId,
    email: String,
    password_hash: String,
    user_role_claim: Option<String>,
    app_role_claim: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = RepositoryError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: parse_email(&row.email)?,
            password_hash: row.password_hash,
            user_role_claim: row.user_role_claim,
            app_role_claim: row.app_role_claim,
            created_at: row.created_at,
        })
    }
}

/// Repository for identity database operations.
pub struct IdentityRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> IdentityRepository<'a> {
    /// Create a new identity repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

fn expect_one(rows_affected: u64) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

#[async_trait]
impl IdentityRecords for IdentityRepository<'_> {
    async fn find(&self, id: ProfileId) -> Result<Option<Identity>, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r"
            SELECT id, email, password_hash, user_role_claim, app_role_claim, created_at
            FROM identities
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r"
            SELECT id, email, password_hash, user_role_claim, app_role_claim, created_at
            FROM identities
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn create(&self, new: &NewIdentity) -> Result<Identity, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r"
            INSERT INTO identities (id, email, password_hash, user_role_claim, app_role_claim)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, password_hash, user_role_claim, app_role_claim, created_at
            ",
        )
        .bind(ProfileId::generate())
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.user_role_claim.as_deref())
        .bind(new.app_role_claim.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "email already registered"))?;

        row.try_into()
    }

    async fn set_password_hash(&self, id: ProfileId, hash: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE identities SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(hash)
            .execute(self.pool)
            .await?;
        expect_one(result.rows_affected())
    }

    async fn set_app_role(&self, id: ProfileId, role: Role) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE identities SET app_role_claim = $2 WHERE id = $1")
            .bind(id)
            .bind(role.as_str())
            .execute(self.pool)
            .await?;
        expect_one(result.rows_affected())
    }

    async fn set_email(&self, id: ProfileId, email: &Email) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE identities SET email = $2 WHERE id = $1")
            .bind(id)
            .bind(email)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "email already registered"))?;
        expect_one(result.rows_affected())
    }
}
