//! Common display utilities and helpers

use chrono::{DateTime, Utc};

/// Truncate string to max characters with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a timestamp as `YYYY-MM-DD HH:MM` UTC
pub fn format_datetime(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// Format an average rating, or `--` when nobody has rated yet
pub fn format_average(average: f64, total: usize) -> String {
    if total == 0 {
        "--".to_string()
    } else {
        format!("{:.1}", average)
    }
}
