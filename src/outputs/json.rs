//! JSON snapshot output.
//!
//! Serializes the current [`FeedView`] (articles, facets and paging flags)
//! so that other tools can consume exactly what the terminal showed.
//!
//! # Output Structure
//!
//! Files are organized by local date, named after the local time of writing:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     └── 173002.json
//! ```

use crate::controller::FeedView;
use crate::utils::ensure_writable_dir;
use chrono::{DateTime, Local};
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// Write a [`FeedView`] to `{json_output_dir}/{date}/{HHMMSS}.json`.
///
/// # Returns
///
/// The path of the written file, or an error if the directory is not
/// writable or the file cannot be written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_snapshot(
    view: &FeedView,
    json_output_dir: &str,
    at: DateTime<Local>,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(view)?;

    let full_json_dir = format!(
        "{}/{}",
        json_output_dir.trim_end_matches('/'),
        at.date_naive()
    );
    ensure_writable_dir(&full_json_dir).await?;

    let path = PathBuf::from(&full_json_dir).join(format!("{}.json", at.format("%H%M%S")));
    fs::write(&path, json).await?;
    info!(path = %path.display(), articles = view.articles.len(), "Wrote JSON snapshot");

    Ok(path)
}
