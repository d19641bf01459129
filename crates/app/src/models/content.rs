//! Content item domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storecast_core::{
    ContentId, ContentStatus, ContentType, ProfileId, RecurrenceType, StoreId, classify,
};

/// A scheduled media asset attached to one store.
///
/// Serialized in the external record shape (`user_id`, `type`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub store_id: StoreId,
    #[serde(rename = "user_id")]
    pub owner_id: ProfileId,
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub file_url: String,
    pub file_size: i64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub recurrence_type: RecurrenceType,
    pub recurrence_days: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ContentItem {
    /// Lifecycle status at `now`. Never stored.
    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> ContentStatus {
        classify(self.start_date, self.end_date, now)
    }
}

/// A content item joined with the store (and owner) it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentListing {
    #[serde(flatten)]
    pub item: ContentItem,
    pub store_name: String,
    pub brand_company: String,
    pub address: String,
    pub owner_email: String,
}

/// Fields for inserting a content record after the file is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContent {
    pub store_id: StoreId,
    pub owner_id: ProfileId,
    pub title: String,
    pub content_type: ContentType,
    pub file_url: String,
    pub file_size: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub recurrence_type: RecurrenceType,
    pub recurrence_days: Vec<String>,
}
