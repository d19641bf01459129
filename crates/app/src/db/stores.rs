//! Store repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use storecast_core::{ProfileId, StoreId};

use super::RepositoryError;
use crate::models::{Store, StoreInput};

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: StoreId,
    owner_id: ProfileId,
    name: String,
    brand_company: String,
    address: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    created_at: DateTime<Utc>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            brand_company: row.brand_company,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            created_at: row.created_at,
        }
    }
}

/// Repository for store database operations.
///
/// Every mutation is scoped by owner: a client can only touch its own rows.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the stores owned by a profile, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: ProfileId) -> Result<Vec<Store>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, owner_id, name, brand_company, address, latitude, longitude, created_at
            FROM stores
            WHERE owner_id = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Count all stores.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_all(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stores")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Create a store for `owner`. `input` must already be validated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        owner: ProfileId,
        input: &StoreInput,
    ) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            INSERT INTO stores (id, owner_id, name, brand_company, address, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, owner_id, name, brand_company, address, latitude, longitude, created_at
            ",
        )
        .bind(StoreId::generate())
        .bind(owner)
        .bind(&input.name)
        .bind(&input.brand_company)
        .bind(&input.address)
        .bind(input.latitude)
        .bind(input.longitude)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update one of `owner`'s stores.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist or is
    /// owned by someone else.
    pub async fn update(
        &self,
        id: StoreId,
        owner: ProfileId,
        input: &StoreInput,
    ) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            UPDATE stores
            SET name = $3, brand_company = $4, address = $5, latitude = $6, longitude = $7
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, name, brand_company, address, latitude, longitude, created_at
            ",
        )
        .bind(id)
        .bind(owner)
        .bind(&input.name)
        .bind(&input.brand_company)
        .bind(&input.address)
        .bind(input.latitude)
        .bind(input.longitude)
        .fetch_optional(self.pool)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Delete one of `owner`'s stores.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store is not `owner`'s,
    /// `RepositoryError::Conflict` if content still references it.
    pub async fn delete(&self, id: StoreId, owner: ProfileId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "store still has content"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
