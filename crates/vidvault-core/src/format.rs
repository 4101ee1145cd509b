//! Display formatting helpers for list views.

use chrono::DateTime;

/// Format a duration in seconds as `MM:SS`.
///
/// Durations of an hour or more keep counting minutes (`75:03`), matching
/// how the player timeline renders.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    let rounded = seconds.round().max(0.0) as u64;
    format!("{:02}:{:02}", rounded / 60, rounded % 60)
}

/// Format a stored RFC 3339 date as `DD/MM/YYYY`.
///
/// Unparseable input is returned unchanged rather than failing a render.
#[must_use]
pub fn format_date(date: &str) -> String {
    DateTime::parse_from_rfc3339(date).map_or_else(
        |_| date.to_string(),
        |parsed| parsed.format("%d/%m/%Y").to_string(),
    )
}
