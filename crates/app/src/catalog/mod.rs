//! Filter, sort, group and paginate content listings.
//!
//! Pure transformations over fetched listings, recomputed on every request.
//! Query-string values are parsed leniently: anything empty or unrecognized
//! means "no constraint" / "default".

pub mod filter;
pub mod group;
pub mod page;
pub mod sort;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

pub use filter::{ContentFilter, filter};
pub use group::{Group, GroupMode, SubGroup, TypeBucket, group, location_of};
pub use page::{Page, ViewMode, effective_page, paginate};
pub use sort::{SortDirection, SortField, SortSpec, sort};

use crate::models::ContentListing;

/// Catalog query-string parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub view: Option<String>,
    pub page: Option<String>,
    pub group: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn date(value: Option<&String>) -> Option<NaiveDate> {
    non_empty(value).and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
}

impl CatalogQuery {
    #[must_use]
    pub fn filter(&self) -> ContentFilter {
        ContentFilter {
            search: non_empty(self.q.as_ref()).map(str::to_owned),
            content_type: non_empty(self.content_type.as_ref()).and_then(|v| v.parse().ok()),
            status: non_empty(self.status.as_ref()).and_then(|v| v.parse().ok()),
            created_after: date(self.from.as_ref()),
            created_before: date(self.to.as_ref()),
        }
    }

    #[must_use]
    pub fn sort_spec(&self) -> SortSpec {
        SortSpec {
            field: non_empty(self.sort.as_ref())
                .and_then(SortField::parse)
                .unwrap_or_default(),
            direction: non_empty(self.dir.as_ref())
                .and_then(SortDirection::parse)
                .unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        non_empty(self.view.as_ref())
            .and_then(ViewMode::parse)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn requested_page(&self) -> Option<usize> {
        non_empty(self.page.as_ref()).and_then(|v| v.parse().ok())
    }

    #[must_use]
    pub fn group_mode(&self) -> Option<GroupMode> {
        non_empty(self.group.as_ref()).and_then(GroupMode::parse)
    }
}

/// Filter then sort.
#[must_use]
pub fn prepare(
    items: Vec<ContentListing>,
    spec: &ContentFilter,
    order: SortSpec,
    now: DateTime<Utc>,
) -> Vec<ContentListing> {
    let mut items = filter(items, spec, now);
    sort(&mut items, order);
    items
}
