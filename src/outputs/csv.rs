//! Dated CSV archive of a run.
//!
//! One row per attempted article, failures included, so the archive shows
//! which sources were unusable on a given day:
//!
//! ```text
//! URL,Status,Error,Keywords,Text
//! https://news.example/a,success,,"[""tariffs"",""ports""]",Dock workers...
//! https://news.example/b,failed,HTTP status 403,[],
//! ```

use crate::error::OutputError;
use crate::models::RunDataset;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

pub const HEADER: [&str; 5] = ["URL", "Status", "Error", "Keywords", "Text"];

/// File name of the archive for a date stamp, e.g. `05_06_25_news.csv`.
pub fn csv_filename(date_stamp: &str) -> String {
    format!("{date_stamp}_news.csv")
}

/// Serialize the dataset to CSV bytes.
pub fn to_csv(dataset: &RunDataset) -> Result<Vec<u8>, OutputError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for article in &dataset.articles {
        let keywords = serde_json::to_string(&article.keywords)?;
        writer.write_record([
            article.url.as_str(),
            article.status.as_str(),
            article.status.reason().unwrap_or(""),
            keywords.as_str(),
            article.text.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| OutputError::Csv(csv::Error::from(e.into_error())))
}

/// Write the dataset to `{output_dir}/{date_stamp}_news.csv`.
#[instrument(level = "info", skip(dataset), fields(rows = dataset.len()))]
pub async fn write_dataset(
    dataset: &RunDataset,
    output_dir: &Path,
    date_stamp: &str,
) -> Result<PathBuf, OutputError> {
    let bytes = to_csv(dataset)?;
    let path = output_dir.join(csv_filename(date_stamp));

    fs::write(&path, bytes)
        .await
        .map_err(|source| OutputError::Io {
            operation: "failed to write CSV",
            path: path.clone(),
            source,
        })?;

    info!(path = %path.display(), rows = dataset.len(), "Wrote CSV archive");
    Ok(path)
}
