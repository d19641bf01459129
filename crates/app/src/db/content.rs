//! Content repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use storecast_core::{ContentId, ContentType, ProfileId, RecurrenceType, StoreId};

use super::RepositoryError;
use crate::models::{ContentItem, ContentListing, NewContent};

/// Content writes used by the upload and delete flows.
#[async_trait]
pub trait ContentRecords: Send + Sync {
    /// Ids of the stores owned by `owner`.
    async fn owned_store_ids(&self, owner: ProfileId) -> Result<Vec<StoreId>, RepositoryError>;

    async fn find(&self, id: ContentId) -> Result<Option<ContentItem>, RepositoryError>;

    async fn insert(&self, new: &NewContent) -> Result<ContentItem, RepositoryError>;

    /// Delete a content record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row was deleted.
    async fn delete(&self, id: ContentId) -> Result<(), RepositoryError>;
}

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct ContentRow {
    id: ContentId,
    store_id: StoreId,
    user_id: ProfileId,
    title: String,
    #[sqlx(rename = "type")]
    content_type: ContentType,
    file_url: String,
    file_size: i64,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    recurrence_type: RecurrenceType,
    recurrence_days: Option<Vec<String>>,
    created_at: DateTime<Utc>,
}

impl From<ContentRow> for ContentItem {
    fn from(row: ContentRow) -> Self {
        Self {
            id: row.id,
            store_id: row.store_id,
            owner_id: row.user_id,
            title: row.title,
            content_type: row.content_type,
            file_url: row.file_url,
            file_size: row.file_size,
            start_date: row.start_date,
            end_date: row.end_date,
            recurrence_type: row.recurrence_type,
            recurrence_days: row.recurrence_days.unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    #[sqlx(flatten)]
    content: ContentRow,
    store_name: String,
    brand_company: String,
    address: String,
    owner_email: String,
}

impl From<ListingRow> for ContentListing {
    fn from(row: ListingRow) -> Self {
        Self {
            item: row.content.into(),
            store_name: row.store_name,
            brand_company: row.brand_company,
            address: row.address,
            owner_email: row.owner_email,
        }
    }
}

const CONTENT_COLUMNS: &str = "c.id, c.store_id, c.user_id, c.title, c.type, c.file_url, \
     c.file_size, c.start_date, c.end_date, c.recurrence_type, c.recurrence_days, c.created_at";

/// Repository for content database operations.
pub struct ContentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContentRepository<'a> {
    /// Create a new content repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    fn listing_query(filter: &str) -> String {
        format!(
            "SELECT {CONTENT_COLUMNS}, s.name AS store_name, s.brand_company, s.address, \
             p.email AS owner_email \
             FROM content c \
             JOIN stores s ON s.id = c.store_id \
             JOIN profiles p ON p.id = c.user_id \
             {filter} \
             ORDER BY c.created_at DESC"
        )
    }

    /// List one owner's content joined with store details, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(
        &self,
        owner: ProfileId,
    ) -> Result<Vec<ContentListing>, RepositoryError> {
        let sql = Self::listing_query("WHERE c.user_id = $1");
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(owner)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List all content across clients, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<ContentListing>, RepositoryError> {
        let sql = Self::listing_query("");
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl ContentRecords for ContentRepository<'_> {
    async fn owned_store_ids(&self, owner: ProfileId) -> Result<Vec<StoreId>, RepositoryError> {
        let ids: Vec<StoreId> = sqlx::query_scalar("SELECT id FROM stores WHERE owner_id = $1")
            .bind(owner)
            .fetch_all(self.pool)
            .await?;
        Ok(ids)
    }

    async fn find(&self, id: ContentId) -> Result<Option<ContentItem>, RepositoryError> {
        let sql = format!("SELECT {CONTENT_COLUMNS} FROM content c WHERE c.id = $1");
        let row = sqlx::query_as::<_, ContentRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn insert(&self, new: &NewContent) -> Result<ContentItem, RepositoryError> {
        let row = sqlx::query_as::<_, ContentRow>(
            r"
            INSERT INTO content (id, store_id, user_id, title, type, file_url, file_size,
                                 start_date, end_date, recurrence_type, recurrence_days)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, store_id, user_id, title, type, file_url, file_size,
                      start_date, end_date, recurrence_type, recurrence_days, created_at
            ",
        )
        .bind(ContentId::generate())
        .bind(new.store_id)
        .bind(new.owner_id)
        .bind(&new.title)
        .bind(new.content_type)
        .bind(&new.file_url)
        .bind(new.file_size)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.recurrence_type)
        .bind(&new.recurrence_days)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete(&self, id: ContentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM content WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
