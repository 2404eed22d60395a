//! HTTP-date helpers for `Last-Modified` and `If-Modified-Since`.

use chrono::{DateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Whole seconds of `time`, floored, or `None` outside chrono's range
fn to_utc_seconds(time: SystemTime) -> Option<DateTime<Utc>> {
    let secs = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).ok()?,
        Err(err) => {
            let before = err.duration();
            let whole = i64::try_from(before.as_secs()).ok()?;
            if before.subsec_nanos() > 0 {
                whole.checked_neg()?.checked_sub(1)?
            } else {
                whole.checked_neg()?
            }
        }
    };
    DateTime::from_timestamp(secs, 0)
}

/// Format a timestamp as an IMF-fixdate, e.g. `Mon, 19 Oct 2026 10:00:00 GMT`.
///
/// Returns `None` when the time cannot be represented as a calendar date.
pub fn format_http_date(time: SystemTime) -> Option<String> {
    to_utc_seconds(time).map(|dt| dt.format(HTTP_DATE_FORMAT).to_string())
}

/// Parse an `If-Modified-Since` value. Returns `None` for anything unparseable.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Whether a file modified at `modified` is unchanged since `since`.
///
/// File times carry sub-second precision while HTTP dates do not, so the
/// modification time is truncated to whole seconds before comparing.
/// A time outside the calendar range never compares as unchanged.
pub fn not_modified_since(modified: SystemTime, since: DateTime<Utc>) -> bool {
    to_utc_seconds(modified).is_some_and(|modified| modified <= since)
}
