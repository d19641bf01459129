//! Invite repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use storecast_core::{Email, InviteId, ProfileId, Role};

use super::{RepositoryError, parse_email};
use crate::models::Invite;

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct InviteRow {
    id: InviteId,
    email: String,
    role: Role,
    token: String,
    invited_by: Option<ProfileId>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
}

impl TryFrom<InviteRow> for Invite {
    type Error = RepositoryError;

    fn try_from(row: InviteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: parse_email(&row.email)?,
            role: row.role,
            token: row.token,
            invited_by: row.invited_by,
            created_at: row.created_at,
            expires_at: row.expires_at,
            used_at: row.used_at,
        })
    }
}

/// Repository for invite database operations.
pub struct InviteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InviteRepository<'a> {
    /// Create a new invite repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an invite that expires `ttl_hours` from now.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the token collides.
    pub async fn create(
        &self,
        email: &Email,
        role: Role,
        token: &str,
        invited_by: Option<ProfileId>,
        ttl_hours: i64,
    ) -> Result<Invite, RepositoryError> {
        let row = sqlx::query_as::<_, InviteRow>(
            r"
            INSERT INTO invites (id, email, role, token, invited_by, expires_at)
            VALUES ($1, $2, $3, $4, $5, NOW() + make_interval(hours => $6::int))
            RETURNING id, email, role, token, invited_by, created_at, expires_at, used_at
            ",
        )
        .bind(InviteId::generate())
        .bind(email)
        .bind(role)
        .bind(token)
        .bind(invited_by)
        .bind(ttl_hours)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "invite token collision"))?;

        row.try_into()
    }

    /// Look up an invite by its token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<Invite>, RepositoryError> {
        let row = sqlx::query_as::<_, InviteRow>(
            r"
            SELECT id, email, role, token, invited_by, created_at, expires_at, used_at
            FROM invites
            WHERE token = $1
            ",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Mark an invite as used.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the invite is missing or already used.
    pub async fn mark_used(&self, id: InviteId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE invites SET used_at = NOW() WHERE id = $1 AND used_at IS NULL",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// List invites that are unused and unexpired, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_pending(&self) -> Result<Vec<Invite>, RepositoryError> {
        let rows = sqlx::query_as::<_, InviteRow>(
            r"
            SELECT id, email, role, token, invited_by, created_at, expires_at, used_at
            FROM invites
            WHERE used_at IS NULL AND expires_at > NOW()
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
