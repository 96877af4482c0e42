use chrono::{DateTime, ParseError, SecondsFormat, Utc};

/// Formats a timestamp as fixed-width RFC 3339 text with nanosecond precision.
///
/// Every value has the same width and a `Z` suffix, so plain string comparison
/// orders them chronologically (for years 0000 through 9999).
/// Example: "2025-09-13T03:49:58.123456789Z"
pub fn to_sortable_rfc3339(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parses an RFC 3339 string into a UTC timestamp.
pub fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}
