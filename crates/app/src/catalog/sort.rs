//! Content sorting.

use std::cmp::Ordering;

use crate::models::ContentListing;

/// Field to sort on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    Title,
    FileSize,
    Type,
}

impl SortField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Title => "title",
            Self::FileSize => "file_size",
            Self::Type => "type",
        }
    }

    /// Parse a query value; unknown values give `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "created_at" => Some(Self::CreatedAt),
            "title" => Some(Self::Title),
            "file_size" => Some(Self::FileSize),
            "type" => Some(Self::Type),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Sort field and direction. Defaults to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Compare two listings under this spec.
    #[must_use]
    pub fn compare(&self, a: &ContentListing, b: &ContentListing) -> Ordering {
        let (a, b) = (&a.item, &b.item);
        let ordering = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::FileSize => a.file_size.cmp(&b.file_size),
            SortField::Type => a.content_type.as_str().cmp(b.content_type.as_str()),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Stable sort: listings with equal keys keep their input order.
pub fn sort(items: &mut [ContentListing], spec: SortSpec) {
    items.sort_by(|a, b| spec.compare(a, b));
}
