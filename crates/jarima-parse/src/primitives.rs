//! Typed string-to-value converters that never fail: malformed input is an
//! absent value, not an error.

use chrono::{NaiveDate, NaiveDateTime};

/// Parse an integer. `format` must be absent; supplying one returns `None`
/// regardless of the input (there is no such thing as a formatted integer
/// here, and the single calling convention is enforced).
pub fn parse_integer(raw: &str, format: Option<&str>) -> Option<i64> {
    if format.is_some() {
        return None;
    }
    raw.parse().ok()
}

/// Parse a date-time against an exact chrono format string. A date-only
/// format yields midnight. `None` format, trailing garbage, or any
/// non-matching input returns `None`.
pub fn parse_date_time(raw: &str, format: Option<&str>) -> Option<NaiveDateTime> {
    let format = format?;
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
        return Some(dt);
    }
    // Formats without time fields (reminder due dates) parse as a bare date.
    NaiveDate::parse_from_str(raw, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
