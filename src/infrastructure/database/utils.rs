//! Database utility functions
//!
//! Datetime helpers shared by the ledger implementations. Timestamps are
//! stored as RFC3339 text with a fixed precision so lexicographic order
//! matches chronological order.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Render a datetime for storage: RFC3339, microsecond precision, `Z`
/// suffix. Fixed width keeps `ORDER BY created_at` chronological.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse datetime from multiple formats (RFC3339 and SQLite default format)
///
/// Supports:
/// - RFC3339: "2025-10-29T17:28:13Z", "2025-10-29T17:28:13+00:00"
/// - SQLite default: "2025-10-29 17:28:13"
/// - ISO 8601 without timezone: "2025-10-29T17:28:13"
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_formatted_timestamps() {
        let now = Utc::now();
        let parsed = parse_datetime(&format_datetime(&now)).unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn parses_sqlite_default_format() {
        use chrono::TimeZone;
        let dt = parse_datetime("2025-10-29 17:28:13").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 10, 29, 17, 28, 13).unwrap());
    }

    #[test]
    fn formatted_order_matches_chronological_order() {
        let earlier = Utc::now();
        let later = earlier + chrono::Duration::microseconds(1);
        assert!(format_datetime(&earlier) < format_datetime(&later));
    }
}
