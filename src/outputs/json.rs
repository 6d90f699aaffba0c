//! JSON run report.
//!
//! The report records what a run attempted and what failed, next to the CSV
//! archive of the same date:
//!
//! ```text
//! output_dir/
//! ├── 05_06_25_news.csv
//! ├── 05_06_25_run_report.json
//! └── original_wordcloud_05_06_25.svg
//! ```

use crate::error::OutputError;
use crate::models::RunSummary;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// File name of the report for a date stamp, e.g. `05_06_25_run_report.json`.
pub fn report_filename(date_stamp: &str) -> String {
    format!("{date_stamp}_run_report.json")
}

/// Write a [`RunSummary`] as pretty-printed JSON.
///
/// # Output Path
///
/// The file is written to: `{output_dir}/{date_stamp}_run_report.json`
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_report(
    summary: &RunSummary,
    output_dir: &Path,
    date_stamp: &str,
) -> Result<PathBuf, OutputError> {
    let json = serde_json::to_string_pretty(summary)?;
    let path = output_dir.join(report_filename(date_stamp));

    info!(path = %path.display(), "Writing JSON report");
    if let Err(e) = fs::write(&path, json).await {
        error!(path = %path.display(), error = %e, "Failed to write JSON report");
        return Err(OutputError::Io {
            operation: "failed to write report",
            path,
            source: e,
        });
    }
    info!(path = %path.display(), "Wrote JSON run report");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedFailure;

    #[tokio::test]
    async fn test_write_report_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let summary = RunSummary {
            date: "05_06_25".to_string(),
            feeds_attempted: 2,
            feeds_failed: 1,
            articles_attempted: 3,
            articles_succeeded: 2,
            articles_failed: 1,
            keywords_total: 17,
            feed_failures: vec![FeedFailure {
                feed: "https://down.example/rss".to_string(),
                reason: "feed unavailable: HTTP status 503".to_string(),
            }],
            article_failures: vec![(
                "https://news.example/b".to_string(),
                "HTTP status 403".to_string(),
            )],
            outputs: vec![dir.path().join("05_06_25_news.csv")],
        };

        let path = write_report(&summary, dir.path(), "05_06_25").await.unwrap();
        assert_eq!(path.file_name().unwrap(), "05_06_25_run_report.json");

        let read: RunSummary =
            serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(read.feeds_failed, 1);
        assert_eq!(read.feed_failures, summary.feed_failures);
        assert_eq!(read.article_failures, summary.article_failures);
        assert_eq!(read.keywords_total, 17);
    }
}
