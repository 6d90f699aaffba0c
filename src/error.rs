//! Error types for each stage of the pipeline.
//!
//! Only [`ConfigError`] and [`OutputError`] ever reach the binary. Feed and
//! article errors are absorbed by the aggregator and recorded in the run
//! dataset instead.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The configuration could not be loaded or is invalid. Fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("config is missing the `feeds` list")]
    MissingFeeds,

    #[error("invalid wordcloud style '{style}': {reason}")]
    InvalidStyle { style: String, reason: String },

    #[error("invalid fetch settings: {0}")]
    InvalidFetch(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A single download failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// A feed could not be read. The feed is skipped and the batch continues.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed unavailable: {0}")]
    Unavailable(#[from] FetchError),

    #[error("feed is not well-formed XML: {0}")]
    Xml(String),

    #[error("document is not an RSS or Atom feed")]
    NotAFeed,
}

/// A single article could not be downloaded or parsed.
#[derive(Debug, Error)]
pub enum ArticleFetchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("no article text could be extracted")]
    NoContent,
}

/// Writing one of the run outputs failed.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("{operation} '{path}': {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image '{path}': {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("invalid font '{0}'")]
    Font(PathBuf),

    #[error("invalid wordcloud style: {0}")]
    Style(String),

    #[error("console I/O failed: {0}")]
    Console(std::io::Error),
}

/// Errors that end a run with a non-zero exit status.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Output(#[from] OutputError),
}
