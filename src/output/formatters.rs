//! Reusable formatting utilities for pretty CLI output
//!
//! Local timestamps and the rating histogram shown by `team show`.

use chrono::{DateTime, Local, Utc};

/// Width of the longest histogram bar
pub const BAR_WIDTH: usize = 20;

/// Format a UTC timestamp as local date/time.
///
/// # Example output
/// `05/01/2024 14:30 CET`
pub fn format_timestamp_local(ts: &DateTime<Utc>) -> String {
    let local = ts.with_timezone(&Local);
    let date_time = local.format("%m/%d/%Y %H:%M").to_string();
    let tz = offset_to_tz_abbrev(local.offset().local_minus_utc());
    format!("{} {}", date_time, tz)
}

/// Convert UTC offset (seconds) to timezone abbreviation.
///
/// Falls back to `UTC+N` for offsets without a common abbreviation.
pub fn offset_to_tz_abbrev(offset_secs: i32) -> String {
    let offset_hours = offset_secs / 3600;
    let abbrev = match offset_hours {
        -10 => "HST",
        -9 => "AKST",
        -8 => "PST",
        -7 => "MST",
        -6 => "CST",
        -5 => "EST",
        0 => "UTC",
        1 => "CET",
        2 => "EET",
        9 => "JST",
        10 => "AEST",
        _ => return format!("UTC{:+}", offset_hours),
    };
    abbrev.to_string()
}

/// Horizontal bar scaled so `max` fills [`BAR_WIDTH`].
///
/// Non-zero counts always get at least one cell.
pub fn rating_bar(count: usize, max: usize) -> String {
    if count == 0 || max == 0 {
        return String::new();
    }
    let cells = (count * BAR_WIDTH).div_ceil(max).clamp(1, BAR_WIDTH);
    "█".repeat(cells)
}
