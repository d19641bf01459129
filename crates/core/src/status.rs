//! Derived lifecycle status of scheduled content.
//!
//! Status is never persisted. It is recomputed from the item's date range
//! and a reference instant every time it is needed, so the same item moves
//! from `Scheduled` to `Active` to `Archived` without any writes.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a content item relative to a reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    /// Starts in the future.
    Scheduled,
    /// Running now (both bounds inclusive).
    Active,
    /// Ended in the past.
    Archived,
    /// A date is missing or unparsable.
    Unknown,
}

impl ContentStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 4] = [Self::Scheduled, Self::Active, Self::Archived, Self::Unknown];

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Archived => "archived",
            Self::Unknown => "unknown",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Active => "Active",
            Self::Archived => "Archived",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(Self::Scheduled),
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("invalid status: {other}")),
        }
    }
}

/// Classify a date range against `now`.
///
/// Checks run in order: missing date, start in the future, end in the past.
/// Both bounds are inclusive, so `start == end == now` is `Active`.
#[must_use]
pub fn classify(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ContentStatus {
    let (Some(start), Some(end)) = (start, end) else {
        return ContentStatus::Unknown;
    };

    if start > now {
        ContentStatus::Scheduled
    } else if end < now {
        ContentStatus::Archived
    } else {
        ContentStatus::Active
    }
}

/// Classify raw date strings, treating unparsable input as missing.
#[must_use]
pub fn classify_raw(start: Option<&str>, end: Option<&str>, now: DateTime<Utc>) -> ContentStatus {
    classify(
        start.and_then(parse_timestamp),
        end.and_then(parse_timestamp),
        now,
    )
}

/// Parse a timestamp as a UTC instant.
///
/// Accepts RFC 3339 (`2025-03-01T09:00:00+02:00`), naive date-times as sent by
/// `datetime-local` inputs (`2025-03-01T09:00`, with or without seconds, `T` or
/// space separated) and bare dates (midnight UTC). Naive values are taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_missing_dates_are_unknown() {
        assert_eq!(classify(None, Some(at(10)), at(9)), ContentStatus::Unknown);
        assert_eq!(classify(Some(at(8)), None, at(9)), ContentStatus::Unknown);
        assert_eq!(classify(None, None, at(9)), ContentStatus::Unknown);
    }

    #[test]
    fn test_future_start_is_scheduled() {
        assert_eq!(
            classify(Some(at(10)), Some(at(12)), at(9)),
            ContentStatus::Scheduled
        );
    }

    #[test]
    fn test_past_end_is_archived() {
        assert_eq!(
            classify(Some(at(1)), Some(at(2)), at(9)),
            ContentStatus::Archived
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let now = at(9);
        assert_eq!(classify(Some(now), Some(now), now), ContentStatus::Active);
        assert_eq!(classify(Some(now), Some(at(10)), now), ContentStatus::Active);
        assert_eq!(classify(Some(at(8)), Some(now), now), ContentStatus::Active);
    }

    #[test]
    fn test_active_iff_within_range() {
        let now = at(12);
        for start_offset in -3..=3_i64 {
            for end_offset in -3..=3_i64 {
                let start = now + Duration::hours(start_offset);
                let end = now + Duration::hours(end_offset);
                let status = classify(Some(start), Some(end), now);
                let expect_active = start <= now && now <= end;
                assert_eq!(status == ContentStatus::Active, expect_active);
                assert_ne!(status, ContentStatus::Unknown);
            }
        }
    }

    #[test]
    fn test_inverted_range_prefers_scheduled() {
        // start in the future wins over an end in the past
        assert_eq!(
            classify(Some(at(11)), Some(at(7)), at(9)),
            ContentStatus::Scheduled
        );
    }

    #[test]
    fn test_classify_raw_unparsable_is_unknown() {
        assert_eq!(
            classify_raw(Some("next tuesday"), Some("2025-06-02"), at(9)),
            ContentStatus::Unknown
        );
        assert_eq!(
            classify_raw(Some("2025-06-01"), Some("2025-06-02"), at(9)),
            ContentStatus::Active
        );
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-01T09:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01T11:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01T09:30"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01 09:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2025-03-01"),
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("03/01/2025"), None);
    }

    #[test]
    fn test_status_parse_roundtrip() {
        for status in ContentStatus::ALL {
            assert_eq!(status.as_str().parse::<ContentStatus>().unwrap(), status);
        }
    }
}
