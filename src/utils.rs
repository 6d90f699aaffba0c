//! Small helpers for date stamps, log previews, and output directories.

use crate::error::OutputError;
use chrono::NaiveDate;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Date stamp used in output file names, e.g. `05_06_25` for 2025-05-06.
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%m_%d_%y").to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a char boundary) with
/// `"…(+N bytes)"` appended.
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
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a scratch file.
///
/// # Errors
///
/// Returns [`OutputError::Io`] if the directory cannot be created or written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), OutputError> {
    fs::create_dir_all(path)
        .await
        .map_err(|source| OutputError::Io {
            operation: "failed to create output directory",
            path: path.to_path_buf(),
            source,
        })?;
    // A small sync write keeps the error surface simple.
    let scratch_path = path.join("..__write_check__");
    match stdfs::File::create(&scratch_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&scratch_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(source) => Err(OutputError::Io {
            operation: "output directory is not writable",
            path: path.to_path_buf(),
            source,
        }),
    }
}
