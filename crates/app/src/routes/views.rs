//! View models shared by the page templates.
//!
//! Templates only see pre-formatted strings and flags.

use chrono::{DateTime, Utc};

use storecast_core::{ContentStatus, ContentType};

use crate::catalog::{CatalogQuery, ContentFilter, Group, GroupMode, Page, SortSpec, ViewMode};
use crate::models::{ContentListing, CurrentUser, Store};

/// Signed-in user shown in the page header.
#[derive(Debug, Clone)]
pub struct UserView {
    pub email: String,
    pub is_admin: bool,
}

impl From<&CurrentUser> for UserView {
    fn from(user: &CurrentUser) -> Self {
        Self {
            email: user.profile.email.to_string(),
            is_admin: user.is_admin(),
        }
    }
}

/// A `<select>` option.
#[derive(Debug, Clone)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl OptionView {
    fn new(value: &str, label: &str, current: &str) -> Self {
        Self {
            value: value.to_owned(),
            label: label.to_owned(),
            selected: value == current,
        }
    }
}

/// Human readable byte size.
#[must_use]
pub fn format_size(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn format_date(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| "-".to_owned(), |d| d.format("%b %-d, %Y").to_string())
}

/// One content item as a card or list row.
#[derive(Debug, Clone)]
pub struct ContentCardView {
    pub id: String,
    pub title: String,
    pub type_label: String,
    pub is_image: bool,
    pub is_video: bool,
    pub is_music: bool,
    pub status_key: String,
    pub status_label: String,
    pub store_name: String,
    pub company: String,
    pub address: String,
    pub owner_email: String,
    pub file_url: String,
    pub file_size: String,
    pub start_date: String,
    pub end_date: String,
    pub recurrence: String,
    pub uploaded: String,
}

impl ContentCardView {
    #[must_use]
    pub fn new(listing: &ContentListing, now: DateTime<Utc>) -> Self {
        let item = &listing.item;
        let status = item.status(now);
        Self {
            id: item.id.to_string(),
            title: item.title.clone(),
            type_label: item.content_type.label().to_owned(),
            is_image: item.content_type == ContentType::Image,
            is_video: item.content_type == ContentType::Video,
            is_music: item.content_type == ContentType::Music,
            status_key: status.as_str().to_owned(),
            status_label: status.label().to_owned(),
            store_name: listing.store_name.clone(),
            company: listing.brand_company.clone(),
            address: listing.address.clone(),
            owner_email: listing.owner_email.clone(),
            file_url: item.file_url.clone(),
            file_size: format_size(item.file_size),
            start_date: format_date(item.start_date),
            end_date: format_date(item.end_date),
            recurrence: item.recurrence_type.describe(&item.recurrence_days),
            uploaded: format_date(Some(item.created_at)),
        }
    }
}

/// A store row.
#[derive(Debug, Clone)]
pub struct StoreView {
    pub id: String,
    pub name: String,
    pub brand_company: String,
    pub address: String,
    pub coordinates: String,
}

impl From<&Store> for StoreView {
    fn from(store: &Store) -> Self {
        let coordinates = match (store.latitude, store.longitude) {
            (Some(lat), Some(lng)) => format!("{lat:.5}, {lng:.5}"),
            _ => String::new(),
        };
        Self {
            id: store.id.to_string(),
            name: store.name.clone(),
            brand_company: store.brand_company.clone(),
            address: store.address.clone(),
            coordinates,
        }
    }
}

/// Counts of content by derived status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsView {
    pub total: usize,
    pub active: usize,
    pub scheduled: usize,
    pub archived: usize,
    pub unknown: usize,
}

impl StatsView {
    #[must_use]
    pub fn count(items: &[ContentListing], now: DateTime<Utc>) -> Self {
        items.iter().fold(Self::default(), |mut stats, listing| {
            stats.total += 1;
            match listing.item.status(now) {
                ContentStatus::Active => stats.active += 1,
                ContentStatus::Scheduled => stats.scheduled += 1,
                ContentStatus::Archived => stats.archived += 1,
                ContentStatus::Unknown => stats.unknown += 1,
            }
            stats
        })
    }
}

/// Filter form state and the select options derived from it.
#[derive(Debug, Clone)]
pub struct FilterView {
    pub q: String,
    pub from: String,
    pub to: String,
    pub view: String,
    pub group: String,
    pub is_grid: bool,
    pub type_options: Vec<OptionView>,
    pub status_options: Vec<OptionView>,
    pub sort_options: Vec<OptionView>,
    pub dir_options: Vec<OptionView>,
    /// Empty unless grouping is offered.
    pub group_options: Vec<OptionView>,
    /// Extra query pairs carried on every link (e.g. `admin_view`).
    carry: Vec<(String, String)>,
    sort: SortSpec,
}

impl FilterView {
    #[must_use]
    pub fn new(query: &CatalogQuery, carry: Vec<(String, String)>) -> Self {
        let filter: ContentFilter = query.filter();
        let sort = query.sort_spec();
        let view = query.view_mode();

        let content_type = filter.content_type.map(ContentType::as_str).unwrap_or_default();
        let mut type_options = vec![OptionView::new("", "All types", content_type)];
        type_options.extend(
            ContentType::ALL
                .iter()
                .map(|t| OptionView::new(t.as_str(), t.label(), content_type)),
        );

        let status = filter.status.map(ContentStatus::as_str).unwrap_or_default();
        let mut status_options = vec![OptionView::new("", "All statuses", status)];
        status_options.extend(
            ContentStatus::ALL
                .iter()
                .map(|s| OptionView::new(s.as_str(), s.label(), status)),
        );

        let sort_options = [
            ("created_at", "Upload date"),
            ("title", "Title"),
            ("file_size", "File size"),
            ("type", "Type"),
        ]
        .iter()
        .map(|(value, label)| OptionView::new(value, label, sort.field.as_str()))
        .collect();
        let dir_options = [("desc", "Descending"), ("asc", "Ascending")]
            .iter()
            .map(|(value, label)| OptionView::new(value, label, sort.direction.as_str()))
            .collect();

        Self {
            q: filter.search.clone().unwrap_or_default(),
            from: filter
                .created_after
                .map(|d| d.to_string())
                .unwrap_or_default(),
            to: filter
                .created_before
                .map(|d| d.to_string())
                .unwrap_or_default(),
            view: view.as_str().to_owned(),
            group: query
                .group_mode()
                .map(GroupMode::as_str)
                .unwrap_or_default()
                .to_owned(),
            is_grid: view == ViewMode::Grid,
            type_options,
            status_options,
            sort_options,
            dir_options,
            group_options: Vec::new(),
            carry,
            sort,
        }
    }

    /// Offer grouping by location or company.
    #[must_use]
    pub fn with_grouping(mut self) -> Self {
        let current = self.group.clone();
        self.group_options = [
            ("", "No grouping"),
            ("location", "Group by location"),
            ("company", "Group by company"),
        ]
        .iter()
        .map(|(value, label)| OptionView::new(value, label, &current))
        .collect();
        self
    }

    /// Query string (with leading `?`) for this filter with overrides.
    #[must_use]
    pub fn query_with(&self, overrides: &[(&str, &str)]) -> String {
        let content_type = self.selected(&self.type_options);
        let status = self.selected(&self.status_options);
        let base = [
            ("q", self.q.as_str()),
            ("type", content_type),
            ("status", status),
            ("from", self.from.as_str()),
            ("to", self.to.as_str()),
            ("sort", self.sort.field.as_str()),
            ("dir", self.sort.direction.as_str()),
            ("view", self.view.as_str()),
            ("group", self.group.as_str()),
        ];

        let mut pairs: Vec<(&str, &str)> = base
            .into_iter()
            .filter(|(key, _)| !overrides.iter().any(|(k, _)| k == key))
            .collect();
        pairs.extend(overrides.iter().copied());
        pairs.extend(self.carry.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let encoded: Vec<String> = pairs
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect();
        format!("?{}", encoded.join("&"))
    }

    fn selected<'a>(&self, options: &'a [OptionView]) -> &'a str {
        options
            .iter()
            .find(|o| o.selected)
            .map_or("", |o| o.value.as_str())
    }

    /// Hidden inputs carried through the filter form.
    #[must_use]
    pub fn carried(&self) -> Vec<OptionView> {
        self.carry
            .iter()
            .map(|(key, value)| OptionView {
                value: value.clone(),
                label: key.clone(),
                selected: true,
            })
            .collect()
    }

    #[must_use]
    pub fn grid_url(&self) -> String {
        self.query_with(&[("view", "grid")])
    }

    #[must_use]
    pub fn list_url(&self) -> String {
        self.query_with(&[("view", "list")])
    }
}

/// Pagination controls.
#[derive(Debug, Clone)]
pub struct PagerView {
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

impl PagerView {
    #[must_use]
    pub fn new<T>(page: &Page<T>, filter: &FilterView) -> Self {
        let link = |n: usize| filter.query_with(&[("page", &n.to_string())]);
        Self {
            number: page.number,
            total_pages: page.total_pages,
            total_items: page.total_items,
            prev_url: page.has_previous().then(|| link(page.number - 1)),
            next_url: page.has_next().then(|| link(page.number + 1)),
        }
    }
}

/// Type bucket for the grouped browser.
#[derive(Debug, Clone)]
pub struct TypeBucketView {
    pub label: String,
    pub cards: Vec<ContentCardView>,
}

#[derive(Debug, Clone)]
pub struct SubGroupView {
    pub key: String,
    pub count: usize,
    pub types: Vec<TypeBucketView>,
}

#[derive(Debug, Clone)]
pub struct GroupView {
    pub key: String,
    pub count: usize,
    pub children: Vec<SubGroupView>,
}

impl From<Group<ContentCardView>> for GroupView {
    fn from(group: Group<ContentCardView>) -> Self {
        Self {
            key: group.key,
            count: group.count,
            children: group
                .children
                .into_iter()
                .map(|sub| SubGroupView {
                    key: sub.key,
                    count: sub.count,
                    types: sub
                        .types
                        .into_iter()
                        .map(|bucket| TypeBucketView {
                            label: bucket.content_type.label().to_owned(),
                            cards: bucket.items,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_query_with_overrides_and_carry() {
        let query = CatalogQuery {
            q: Some("spring sale".to_owned()),
            content_type: Some("video".to_owned()),
            ..CatalogQuery::default()
        };
        let filter = FilterView::new(&query, vec![("admin_view".to_owned(), "abc".to_owned())]);
        let url = filter.query_with(&[("page", "2")]);
        assert_eq!(
            url,
            "?q=spring%20sale&type=video&sort=created_at&dir=desc&view=grid&page=2&admin_view=abc"
        );
        assert!(filter.list_url().contains("view=list"));
        assert!(!filter.list_url().contains("view=grid"));
    }

    #[test]
    fn test_selected_options() {
        let query = CatalogQuery {
            status: Some("archived".to_owned()),
            ..CatalogQuery::default()
        };
        let filter = FilterView::new(&query, Vec::new());
        let selected: Vec<_> = filter
            .status_options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(selected, vec!["archived"]);
    }
}
