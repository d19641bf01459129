//! CSV export of content listings.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::ContentListing;

/// Header row of every content export.
pub const CSV_HEADER: &str =
    "Title,Type,Store,Company,Address,Start Date,End Date,Recurrence,File URL,Upload Date";

/// Quote a field, doubling internal quotes.
#[must_use]
pub fn escape_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn date(value: Option<DateTime<Utc>>) -> String {
    value.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// Render listings as CSV: header, then one quoted row per listing.
///
/// Rows are joined with `\n`; there is no trailing newline.
#[must_use]
pub fn to_csv(rows: &[ContentListing]) -> String {
    let mut csv = String::from(CSV_HEADER);
    for row in rows {
        let item = &row.item;
        let fields = [
            item.title.clone(),
            item.content_type.as_str().to_owned(),
            row.store_name.clone(),
            row.brand_company.clone(),
            row.address.clone(),
            date(item.start_date),
            date(item.end_date),
            item.recurrence_type.describe(&item.recurrence_days),
            item.file_url.clone(),
            date(Some(item.created_at)),
        ];
        let line = fields
            .iter()
            .map(|f| escape_field(f))
            .collect::<Vec<_>>()
            .join(",");
        csv.push('\n');
        csv.push_str(&line);
    }
    csv
}

fn filename_safe(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '-' | '_' | '+'))
        .collect()
}

/// File name for a single client's export.
#[must_use]
pub fn client_export_filename(email: &str, on: NaiveDate) -> String {
    format!(
        "client-data-{}-{}.csv",
        filename_safe(email),
        on.format("%Y-%m-%d")
    )
}

/// File name for the admin bulk export.
#[must_use]
pub fn bulk_export_filename(on: NaiveDate) -> String {
    format!("content-export-{}.csv", on.format("%Y-%m-%d"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "\"plain\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field(""), "\"\"");
    }

    #[test]
    fn test_filenames() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(
            client_export_filename("owner@shop.com", day),
            "client-data-owner@shop.com-2026-03-09.csv"
        );
        assert_eq!(
            client_export_filename("we\"ird@shop.com", day),
            "client-data-weird@shop.com-2026-03-09.csv"
        );
        assert_eq!(bulk_export_filename(day), "content-export-2026-03-09.csv");
    }

    #[test]
    fn test_empty_export_is_header_only() {
        assert_eq!(to_csv(&[]), CSV_HEADER);
    }
}
