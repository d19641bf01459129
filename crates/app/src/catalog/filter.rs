//! Content filters.

use chrono::{DateTime, NaiveDate, Utc};

use storecast_core::{ContentStatus, ContentType};

use crate::models::ContentListing;

/// Active filter constraints. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    /// Case-insensitive substring over title, store name and company.
    pub search: Option<String>,
    pub content_type: Option<ContentType>,
    /// Compared against the status derived at the reference time.
    pub status: Option<ContentStatus>,
    /// Inclusive lower bound on the upload date.
    pub created_after: Option<NaiveDate>,
    /// Inclusive upper bound on the upload date.
    pub created_before: Option<NaiveDate>,
}

impl ContentFilter {
    /// True if no constraint is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True if `listing` satisfies every active constraint.
    #[must_use]
    pub fn matches(&self, listing: &ContentListing, now: DateTime<Utc>) -> bool {
        let item = &listing.item;

        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let hit = [&item.title, &listing.store_name, &listing.brand_company]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if self.content_type.is_some_and(|t| t != item.content_type) {
            return false;
        }
        if self.status.is_some_and(|s| s != item.status(now)) {
            return false;
        }

        let created = item.created_at.date_naive();
        if self.created_after.is_some_and(|after| created < after) {
            return false;
        }
        if self.created_before.is_some_and(|before| created > before) {
            return false;
        }
        true
    }

    /// Stable string form, used to notice when the filter changed.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        format!(
            "q={}|type={}|status={}|after={}|before={}",
            self.search.as_deref().unwrap_or_default(),
            self.content_type.map(|t| t.as_str()).unwrap_or_default(),
            self.status.map(|s| s.as_str()).unwrap_or_default(),
            self.created_after.map(|d| d.to_string()).unwrap_or_default(),
            self.created_before.map(|d| d.to_string()).unwrap_or_default(),
        )
    }
}

/// Keep the listings that match `spec`, preserving order.
#[must_use]
pub fn filter(
    items: Vec<ContentListing>,
    spec: &ContentFilter,
    now: DateTime<Utc>,
) -> Vec<ContentListing> {
    if spec.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|listing| spec.matches(listing, now))
        .collect()
}
