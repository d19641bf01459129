//! Profile repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use storecast_core::{Email, ProfileId, Role};

use super::{Access, RepositoryError, parse_email};
use crate::models::{NewProfile, Profile};

/// Profile lookups and lazy creation used by the role resolver and the guard.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::AccessDenied` if `access` cannot reach `id`,
    /// `RepositoryError::Database` if the query fails.
    async fn find(&self, id: ProfileId, access: Access) -> Result<Option<Profile>, RepositoryError>;

    /// Create a profile row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::AccessDenied` for an owner creating someone
    /// else's row or an admin row, `RepositoryError::Conflict` if it exists.
    async fn create(&self, new: &NewProfile, access: Access) -> Result<Profile, RepositoryError>;

    /// Insert or update a profile's email and role with service access.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email belongs to another profile.
    async fn upsert(&self, profile: &NewProfile) -> Result<Profile, RepositoryError>;
}

/// A client profile with store and content counts, for the admin list.
#[derive(Debug, Clone)]
pub struct ClientSummary {
    pub profile: Profile,
    pub store_count: i64,
    pub content_count: i64,
}

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: ProfileId,
    email: String,
    role: Role,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: parse_email(&row.email)?,
            role: row.role,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ClientSummaryRow {
    id: ProfileId,
    email: String,
    role: Role,
    created_at: DateTime<Utc>,
    store_count: i64,
    content_count: i64,
}

impl TryFrom<ClientSummaryRow> for ClientSummary {
    type Error = RepositoryError;

    fn try_from(row: ClientSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            profile: ProfileRow {
                id: row.id,
                email: row.email,
                role: row.role,
                created_at: row.created_at,
            }
            .try_into()?,
            store_count: row.store_count,
            content_count: row.content_count,
        })
    }
}

/// Repository for profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a profile by id with service access.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProfileId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT id, email, role, created_at
            FROM profiles
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a profile by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT id, email, role, created_at
            FROM profiles
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List client profiles with their store and content counts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_clients(&self) -> Result<Vec<ClientSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, ClientSummaryRow>(
            r"
            SELECT p.id, p.email, p.role, p.created_at,
                   (SELECT COUNT(*) FROM stores s WHERE s.owner_id = p.id) AS store_count,
                   (SELECT COUNT(*) FROM content c WHERE c.user_id = p.id) AS content_count
            FROM profiles p
            WHERE p.role = 'client'
            ORDER BY p.created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Count profiles with the given role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_role(&self, role: Role) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE role = $1")
            .bind(role)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository<'_> {
    async fn find(
        &self,
        id: ProfileId,
        access: Access,
    ) -> Result<Option<Profile>, RepositoryError> {
        if !access.reaches(id) {
            return Err(RepositoryError::AccessDenied);
        }
        self.get_by_id(id).await
    }

    async fn create(&self, new: &NewProfile, access: Access) -> Result<Profile, RepositoryError> {
        if !access.reaches(new.id) {
            return Err(RepositoryError::AccessDenied);
        }
        if matches!(access, Access::Owner(_)) && new.role.is_admin() {
            return Err(RepositoryError::AccessDenied);
        }

        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            INSERT INTO profiles (id, email, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, role, created_at
            ",
        )
        .bind(new.id)
        .bind(&new.email)
        .bind(new.role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "profile already exists"))?;

        row.try_into()
    }

    async fn upsert(&self, profile: &NewProfile) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            INSERT INTO profiles (id, email, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email, role = EXCLUDED.role
            RETURNING id, email, role, created_at
            ",
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(profile.role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "email already in use"))?;

        row.try_into()
    }
}
