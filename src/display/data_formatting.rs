use jiff::Timestamp;
use jiff::tz::TimeZone;

/// Longest description excerpt shown in list views.
pub const DESCRIPTION_EXCERPT_LEN: usize = 120;

const TIMESTAMP_FORMAT: &str = "%b %d, %Y %H:%M";

/// Shorten a description to `max` characters, ending in `...` when cut.
pub fn truncate_description(description: &str, max: usize) -> String {
    if description.chars().count() <= max {
        return description.to_string();
    }
    let cut: String = description.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}

/// Render a creation time like `Mar 04, 2025 14:30` in the local time zone.
pub fn format_timestamp(ts: Timestamp) -> String {
    format_timestamp_in(ts, TimeZone::system())
}

pub fn format_timestamp_in(ts: Timestamp, tz: TimeZone) -> String {
    ts.to_zoned(tz).strftime(TIMESTAMP_FORMAT).to_string()
}

/// A fixed-width bar for a percentage in `0..=100`.
pub fn percentage_bar(percent: u64, width: usize) -> String {
    let filled = ((percent.min(100) as usize) * width + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
