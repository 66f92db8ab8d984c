//! Display formatting for upstream timestamps and icon codes.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt::Write;

/// Full weekday, date and 12-hour local time.
pub const FULL_DATE_TIME: &str = "%A, %d %b %Y | Local time: %I:%M %p";
/// Abbreviated weekday, used for daily forecast titles.
pub const WEEKDAY_SHORT: &str = "%a";
/// Hour, minute and meridiem, used for hourly forecast titles.
pub const HOUR_MINUTE: &str = "%I:%M %p";

const ICON_BASE_URL: &str = "http://openweathermap.org/img/wn";

/// Render `epoch_secs` in the IANA zone `zone` using a strftime `pattern`.
///
/// Never fails: an unknown zone renders in UTC, an out-of-range timestamp
/// renders as the raw seconds and a malformed pattern falls back to RFC 3339.
pub fn format_local_time(epoch_secs: i64, zone: &str, pattern: &str) -> String {
    let Some(instant) = DateTime::<Utc>::from_timestamp(epoch_secs, 0) else {
        tracing::warn!(epoch_secs, "timestamp out of range");
        return epoch_secs.to_string();
    };

    match zone.parse::<Tz>() {
        Ok(tz) => render(&instant.with_timezone(&tz), pattern),
        Err(_) => {
            tracing::warn!(zone, "unknown time zone, rendering in UTC");
            render(&instant, pattern)
        }
    }
}

pub fn format_local_time_default(epoch_secs: i64, zone: &str) -> String {
    format_local_time(epoch_secs, zone, FULL_DATE_TIME)
}

fn render<Z>(instant: &DateTime<Z>, pattern: &str) -> String
where
    Z: TimeZone,
    Z::Offset: std::fmt::Display,
{
    let mut out = String::new();
    if write!(out, "{}", instant.format(pattern)).is_err() {
        tracing::warn!(pattern, "invalid time pattern");
        return instant.to_rfc3339();
    }
    out
}

pub fn icon_url_from_code(code: &str) -> String {
    format!("{ICON_BASE_URL}/{code}@2x.png")
}
