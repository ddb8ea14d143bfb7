//! Time utilities for message timestamps.
//!
//! The host store stamps messages in Unix milliseconds; everything in this
//! crate keeps that representation and only converts at the display edge.

use chrono::TimeZone;

/// Returns the current Unix timestamp in milliseconds.
pub fn now_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Formats a millisecond Unix timestamp as a clock time (`HH:MM:SS`, UTC).
///
/// An out-of-range timestamp formats as an empty string rather than
/// panicking, since the value comes from the remote store and is not
/// trusted.
pub fn format_timestamp(millis: i64) -> String {
    match chrono::Utc.timestamp_millis_opt(millis) {
        chrono::LocalResult::Single(dt) => dt.format("%H:%M:%S").to_string(),
        _ => String::new(),
    }
}
