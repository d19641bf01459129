//! Properties of the filter, sort, group and status engine over the public
//! library API.

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Duration, TimeZone, Utc};

use storecast_app::catalog::{
    ContentFilter, GroupMode, SortDirection, SortField, SortSpec, filter, group, prepare, sort,
};
use storecast_app::models::{ContentItem, ContentListing};
use storecast_core::{
    ContentId, ContentStatus, ContentType, ProfileId, RecurrenceType, StoreId, classify,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 9, 30, 0).unwrap()
}

fn listing(
    title: &str,
    kind: ContentType,
    size: i64,
    address: &str,
    company: &str,
) -> ContentListing {
    ContentListing {
        item: ContentItem {
            id: ContentId::generate(),
            store_id: StoreId::generate(),
            owner_id: ProfileId::generate(),
            title: title.to_owned(),
            content_type: kind,
            file_url: format!("https://cdn.example/{title}"),
            file_size: size,
            start_date: Some(now() - Duration::hours(1)),
            end_date: Some(now() + Duration::hours(1)),
            recurrence_type: RecurrenceType::None,
            recurrence_days: Vec::new(),
            created_at: now() - Duration::days(size),
        },
        store_name: format!("{company} {address}"),
        brand_company: company.to_owned(),
        address: address.to_owned(),
        owner_email: "owner@shop.com".to_owned(),
    }
}

fn sample() -> Vec<ContentListing> {
    vec![
        listing("Spring", ContentType::Image, 3, "1 Mall Rd, Leeds", "Acme"),
        listing("anthem", ContentType::Music, 1, "Airport, York", "Globex"),
        listing("Promo", ContentType::Video, 3, "1 Mall Rd, Leeds", "Acme"),
        listing("banner", ContentType::Image, 2, "", "Globex"),
        listing("Teaser", ContentType::Video, 5, "Airport, York", ""),
    ]
}

fn titles(items: &[ContentListing]) -> Vec<&str> {
    items.iter().map(|l| l.item.title.as_str()).collect()
}

// =============================================================================
// Status
// =============================================================================

#[test]
fn test_classify_is_active_iff_inside_inclusive_range() {
    let at = now();
    let offsets = [-2, -1, 0, 1, 2];
    for start in offsets {
        for end in offsets {
            let s = at + Duration::minutes(start);
            let e = at + Duration::minutes(end);
            let status = classify(Some(s), Some(e), at);
            assert_eq!(
                status == ContentStatus::Active,
                s <= at && at <= e,
                "start {start} end {end}"
            );
        }
    }
}

#[test]
fn test_classify_boundaries() {
    let at = now();
    assert_eq!(classify(Some(at), Some(at), at), ContentStatus::Active);
    assert_eq!(
        classify(Some(at + Duration::seconds(1)), Some(at + Duration::days(1)), at),
        ContentStatus::Scheduled
    );
    assert_eq!(
        classify(Some(at - Duration::days(1)), Some(at - Duration::seconds(1)), at),
        ContentStatus::Archived
    );
    assert_eq!(classify(None, Some(at), at), ContentStatus::Unknown);
    assert_eq!(classify(Some(at), None, at), ContentStatus::Unknown);
}

// =============================================================================
// Filter
// =============================================================================

#[test]
fn test_empty_filter_is_identity() {
    let items = sample();
    let expected: Vec<String> = items.iter().map(|l| l.item.title.clone()).collect();
    let kept = filter(items, &ContentFilter::default(), now());
    assert_eq!(titles(&kept), expected);
}

#[test]
fn test_filter_by_status_uses_classifier() {
    let mut items = sample();
    items[1].item.start_date = Some(now() + Duration::days(2));
    items[1].item.end_date = Some(now() + Duration::days(3));
    items[3].item.end_date = None;

    let scheduled = ContentFilter {
        status: Some(ContentStatus::Scheduled),
        ..ContentFilter::default()
    };
    assert_eq!(titles(&filter(items.clone(), &scheduled, now())), vec!["anthem"]);

    let unknown = ContentFilter {
        status: Some(ContentStatus::Unknown),
        ..ContentFilter::default()
    };
    assert_eq!(titles(&filter(items, &unknown, now())), vec!["banner"]);
}

// =============================================================================
// Sort
// =============================================================================

#[test]
fn test_sort_is_stable_and_idempotent() {
    let spec = SortSpec {
        field: SortField::FileSize,
        direction: SortDirection::Asc,
    };
    let mut once = sample();
    sort(&mut once, spec);
    assert_eq!(titles(&once), vec!["anthem", "banner", "Spring", "Promo", "Teaser"]);

    let mut twice = once.clone();
    sort(&mut twice, spec);
    assert_eq!(titles(&once), titles(&twice));
}

#[test]
fn test_reversed_direction_keeps_ties_in_input_order() {
    let mut desc = sample();
    sort(
        &mut desc,
        SortSpec {
            field: SortField::FileSize,
            direction: SortDirection::Desc,
        },
    );
    // Spring and Promo share a size and keep their input order.
    assert_eq!(titles(&desc), vec!["Teaser", "Spring", "Promo", "banner", "anthem"]);
}

#[test]
fn test_prepare_filters_then_sorts() {
    let spec = ContentFilter {
        content_type: Some(ContentType::Image),
        ..ContentFilter::default()
    };
    let order = SortSpec {
        field: SortField::Title,
        direction: SortDirection::Asc,
    };
    let items = prepare(sample(), &spec, order, now());
    assert_eq!(titles(&items), vec!["banner", "Spring"]);
}

// =============================================================================
// Group
// =============================================================================

fn leaf_count<T>(groups: &[storecast_app::catalog::Group<T>]) -> usize {
    groups
        .iter()
        .flat_map(|g| &g.children)
        .flat_map(|s| &s.types)
        .map(|t| t.items.len())
        .sum()
}

#[test]
fn test_grouping_is_a_total_partition() {
    for mode in [GroupMode::Location, GroupMode::Company] {
        let items = sample();
        let total = items.len();
        let groups = group(items, mode);

        assert_eq!(leaf_count(&groups), total);
        assert_eq!(groups.iter().map(|g| g.count).sum::<usize>(), total);
        for g in &groups {
            assert_eq!(g.children.iter().map(|s| s.count).sum::<usize>(), g.count);
        }

        let mut seen: Vec<String> = groups
            .iter()
            .flat_map(|g| &g.children)
            .flat_map(|s| &s.types)
            .flat_map(|t| &t.items)
            .map(|l| l.item.title.clone())
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), total);
    }
}

#[test]
fn test_grouping_uses_unknown_placeholders() {
    let groups = group(sample(), GroupMode::Location);
    let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
    assert!(keys.contains(&"Unknown Location"));

    let by_company = group(sample(), GroupMode::Company);
    let keys: Vec<&str> = by_company.iter().map(|g| g.key.as_str()).collect();
    assert!(keys.contains(&"Unknown Company"));
}

#[test]
fn test_leaves_keep_sorted_order() {
    let mut items = sample();
    items.push(listing("Zeta", ContentType::Video, 4, "1 Mall Rd, Leeds", "Acme"));
    sort(
        &mut items,
        SortSpec {
            field: SortField::Title,
            direction: SortDirection::Desc,
        },
    );
    let groups = group(items, GroupMode::Company);
    let acme = groups.iter().find(|g| g.key == "Acme").unwrap();
    let videos = acme.children[0]
        .types
        .iter()
        .find(|t| t.content_type == ContentType::Video)
        .unwrap();
    assert_eq!(titles(&videos.items), vec!["Zeta", "Promo"]);
}
