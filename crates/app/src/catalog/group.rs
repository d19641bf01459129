//! Three-level grouping for the admin content browser.

use std::collections::BTreeMap;

use storecast_core::ContentType;

use crate::models::ContentListing;

/// Label used when an address yields no location.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";
/// Label used when a store has no company.
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

/// Which key forms the outer level. The type is always the innermost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupMode {
    /// location, then company, then type
    #[default]
    Location,
    /// company, then location, then type
    Company,
}

impl GroupMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Company => "company",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "location" => Some(Self::Location),
            "company" => Some(Self::Company),
            _ => None,
        }
    }
}

/// Location of an address: the part before the first comma, trimmed.
#[must_use]
pub fn location_of(address: &str) -> String {
    let head = address.split(',').next().unwrap_or_default().trim();
    if head.is_empty() {
        UNKNOWN_LOCATION.to_owned()
    } else {
        head.to_owned()
    }
}

fn company_of(listing: &ContentListing) -> String {
    let company = listing.brand_company.trim();
    if company.is_empty() {
        UNKNOWN_COMPANY.to_owned()
    } else {
        company.to_owned()
    }
}

/// Leaf bucket: items of one type, in the order they were given.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeBucket<T> {
    pub content_type: ContentType,
    pub items: Vec<T>,
}

/// Second-level group.
#[derive(Debug, Clone, PartialEq)]
pub struct SubGroup<T> {
    pub key: String,
    pub count: usize,
    pub types: Vec<TypeBucket<T>>,
}

/// Outer group.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<T> {
    pub key: String,
    pub count: usize,
    pub children: Vec<SubGroup<T>>,
}

impl<T> Group<T> {
    /// Convert every leaf item, keeping the structure.
    #[must_use]
    pub fn map_items<U>(self, f: &impl Fn(T) -> U) -> Group<U> {
        Group {
            key: self.key,
            count: self.count,
            children: self
                .children
                .into_iter()
                .map(|sub| SubGroup {
                    key: sub.key,
                    count: sub.count,
                    types: sub
                        .types
                        .into_iter()
                        .map(|bucket| TypeBucket {
                            content_type: bucket.content_type,
                            items: bucket.items.into_iter().map(f).collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

type Tree = BTreeMap<String, BTreeMap<String, BTreeMap<ContentType, Vec<ContentListing>>>>;

/// Partition listings into outer/inner/type buckets.
///
/// Keys are ordered alphabetically (types in display order); each leaf keeps
/// the input order, so sort before grouping.
#[must_use]
pub fn group(items: Vec<ContentListing>, mode: GroupMode) -> Vec<Group<ContentListing>> {
    let mut tree = Tree::new();
    for listing in items {
        let location = location_of(&listing.address);
        let company = company_of(&listing);
        let (outer, inner) = match mode {
            GroupMode::Location => (location, company),
            GroupMode::Company => (company, location),
        };
        tree.entry(outer)
            .or_default()
            .entry(inner)
            .or_default()
            .entry(listing.item.content_type)
            .or_default()
            .push(listing);
    }

    tree.into_iter()
        .map(|(key, inner)| {
            let children: Vec<SubGroup<ContentListing>> = inner
                .into_iter()
                .map(|(key, types)| {
                    let types: Vec<TypeBucket<ContentListing>> = types
                        .into_iter()
                        .map(|(content_type, items)| TypeBucket {
                            content_type,
                            items,
                        })
                        .collect();
                    SubGroup {
                        key,
                        count: types.iter().map(|b| b.items.len()).sum(),
                        types,
                    }
                })
                .collect();
            Group {
                key,
                count: children.iter().map(|c| c.count).sum(),
                children,
            }
        })
        .collect()
}
