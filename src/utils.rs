//! Utility functions for timestamp parsing, text clean-up and file system checks.
//!
//! This module provides helper functions used throughout the crate:
//! - Lenient timestamp parsing for the three provider date formats
//! - Markup stripping for provider descriptions that embed HTML
//! - String truncation for logging upstream bodies
//! - File system validation for output directories

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use scraper::Html;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Parse a provider timestamp, keeping the offset it was reported in.
///
/// Providers disagree on the format:
/// - NewsAPI and the Guardian send RFC 3339 in UTC (`2025-05-06T14:30:00Z`)
/// - The NYT sends RFC 3339 with an offset (`2025-05-06T05:00:24-04:00`)
/// - Some feeds omit the zone or the time entirely
///
/// Zone-less values are taken to be UTC; date-only values are midnight UTC.
/// The offset matters for the calendar day: `2025-05-06T21:00:00-04:00` is
/// still May 6 for the publisher even though it is May 7 in UTC.
///
/// # Returns
///
/// `None` if no supported format matches.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().fixed_offset());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Reduce an HTML fragment to its visible text.
///
/// The Guardian `trailText` field regularly carries `<strong>`, `<a>` and
/// entity-encoded characters. Whitespace runs are collapsed to one space.
pub fn strip_markup(fragment: &str) -> String {
    if !fragment.contains('<') && !fragment.contains('&') {
        return fragment.trim().to_string();
    }
    let parsed = Html::parse_fragment(fragment);
    parsed
        .root_element()
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes (backed off to a char boundary)
/// with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
