//! The batch run: read feeds, fetch articles, write outputs.
//!
//! Stages, in order:
//! 1. [`discover`]: read every configured feed, skipping failures
//! 2. [`fetch_discovered`]: download and parse every discovered article
//! 3. [`write_output`] for each of [`planned_outputs`]: CSV, wordclouds,
//!    then the run report
//!
//! [`run_pipeline`] runs them back to back; the `step` command pauses
//! between them.

use crate::config::{Config, FetchSettings};
use crate::error::{OutputError, PipelineError};
use crate::feeds::read_feed;
use crate::http::Fetch;
use crate::models::{FeedFailure, RunDataset, RunSummary};
use crate::outputs::wordcloud::render_wordcloud;
use crate::outputs::{csv, json};
use crate::scrapers::article::fetch_articles;
use crate::utils::{date_stamp, ensure_writable_dir};
use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error, info, instrument, warn};

/// Where and for which date a run writes its outputs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub output_dir: PathBuf,
    pub date: NaiveDate,
}

impl RunOptions {
    pub fn date_stamp(&self) -> String {
        date_stamp(self.date)
    }
}

/// Article links found across all feeds, in feed order then document order.
#[derive(Debug, Default, Clone)]
pub struct Discovery {
    pub feeds_attempted: usize,
    pub feed_failures: Vec<FeedFailure>,
    pub links: Vec<String>,
}

/// Read each feed in order. Failed feeds are recorded and skipped.
#[instrument(level = "info", skip_all, fields(feeds = feeds.len()))]
pub async fn discover<F: Fetch>(fetcher: &F, feeds: &[String], settings: &FetchSettings) -> Discovery {
    let mut discovery = Discovery {
        feeds_attempted: feeds.len(),
        ..Discovery::default()
    };

    for feed in feeds {
        match read_feed(fetcher, feed, settings.timeout()).await {
            Ok(links) => {
                debug!(feed = links.feed(), count = links.len(), "Queued article links");
                discovery.links.extend(links);
            }
            Err(e) => {
                warn!(%feed, error = %e, "Skipping feed");
                discovery.feed_failures.push(FeedFailure::new(feed, &e));
            }
        }
    }

    info!(
        attempted = discovery.feeds_attempted,
        failed = discovery.feed_failures.len(),
        links = discovery.links.len(),
        "Read feeds"
    );
    discovery
}

/// Fetch every discovered link. The dataset has one article per link.
pub async fn fetch_discovered<F: Fetch>(
    fetcher: &F,
    discovery: Discovery,
    settings: &FetchSettings,
) -> RunDataset {
    let articles = fetch_articles(
        fetcher,
        discovery.links,
        settings.timeout(),
        settings.concurrency,
    )
    .await;
    RunDataset {
        feeds_attempted: discovery.feeds_attempted,
        feed_failures: discovery.feed_failures,
        articles,
    }
}

/// Read all feeds and fetch all their articles. Never fails: feed and
/// article failures end up in the dataset.
pub async fn collect_articles<F: Fetch>(
    fetcher: &F,
    feeds: &[String],
    settings: &FetchSettings,
) -> RunDataset {
    let discovery = discover(fetcher, feeds, settings).await;
    fetch_discovered(fetcher, discovery, settings).await
}

/// One output file a run will try to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedOutput {
    Csv,
    /// Index into [`Config::wordclouds`].
    Wordcloud(usize),
    Report,
}

impl PlannedOutput {
    pub fn describe(self, config: &Config) -> String {
        match self {
            PlannedOutput::Csv => "CSV archive".to_string(),
            PlannedOutput::Wordcloud(i) => format!("wordcloud '{}'", config.wordclouds[i].name),
            PlannedOutput::Report => "run report".to_string(),
        }
    }
}

impl fmt::Display for PlannedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannedOutput::Csv => write!(f, "csv"),
            PlannedOutput::Wordcloud(i) => write!(f, "wordcloud#{i}"),
            PlannedOutput::Report => write!(f, "report"),
        }
    }
}

/// Outputs enabled by `config`. The report comes last so that it can list
/// the others.
pub fn planned_outputs(config: &Config) -> Vec<PlannedOutput> {
    let mut planned = Vec::new();
    if config.output.csv {
        planned.push(PlannedOutput::Csv);
    }
    planned.extend((0..config.wordclouds.len()).map(PlannedOutput::Wordcloud));
    if config.output.report {
        planned.push(PlannedOutput::Report);
    }
    planned
}

/// Write one output. `Ok(None)` means there was nothing to draw.
#[instrument(level = "info", skip(config, dataset, summary, options))]
pub async fn write_output(
    output: PlannedOutput,
    config: &Config,
    dataset: &RunDataset,
    summary: &RunSummary,
    options: &RunOptions,
) -> Result<Option<PathBuf>, OutputError> {
    let stamp = options.date_stamp();
    match output {
        PlannedOutput::Csv => csv::write_dataset(dataset, &options.output_dir, &stamp)
            .await
            .map(Some),
        PlannedOutput::Wordcloud(i) => {
            render_wordcloud(
                &dataset.keyword_frequencies(),
                &config.wordclouds[i],
                &options.output_dir,
                &stamp,
            )
            .await
        }
        PlannedOutput::Report => {
            let mut summary = summary.clone();
            summary
                .outputs
                .push(options.output_dir.join(json::report_filename(&stamp)));
            json::write_report(&summary, &options.output_dir, &stamp)
                .await
                .map(Some)
        }
    }
}

/// Write every planned output, recording the paths in `summary`.
///
/// A failed output does not stop the others; the first error is returned
/// once all have been attempted.
pub async fn write_outputs(
    config: &Config,
    dataset: &RunDataset,
    summary: &mut RunSummary,
    options: &RunOptions,
) -> Result<(), OutputError> {
    let mut first_error = None;
    for output in planned_outputs(config) {
        match write_output(output, config, dataset, summary, options).await {
            Ok(Some(path)) => summary.outputs.push(path),
            Ok(None) => {}
            Err(e) => {
                error!(%output, error = %e, "Failed to write output");
                first_error.get_or_insert(e);
            }
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// Log the end-of-run counts.
pub fn log_summary(summary: &RunSummary) {
    info!(
        date = %summary.date,
        feeds_attempted = summary.feeds_attempted,
        feeds_failed = summary.feeds_failed,
        articles_succeeded = summary.articles_succeeded,
        articles_failed = summary.articles_failed,
        keywords = summary.keywords_total,
        outputs = summary.outputs.len(),
        "Run complete"
    );
}

/// Run every stage without pausing.
#[instrument(level = "info", skip_all, fields(date = %options.date))]
pub async fn run_pipeline<F: Fetch>(
    config: &Config,
    fetcher: &F,
    options: &RunOptions,
) -> Result<RunSummary, PipelineError> {
    ensure_writable_dir(&options.output_dir).await?;
    if config.feeds().is_empty() {
        warn!("No feeds configured");
    }

    let dataset = collect_articles(fetcher, config.feeds(), &config.fetch).await;
    let mut summary = RunSummary::from_dataset(&dataset, &options.date_stamp());
    let written = write_outputs(config, &dataset, &mut summary, options).await;
    log_summary(&summary);
    written?;
    Ok(summary)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn options(dir: &std::path::Path) -> RunOptions {
        RunOptions {
            output_dir: dir.to_path_buf(),
            date: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
        }
    }

    fn files(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_collect_keeps_one_entry_per_link() {
        let config = config(&[GOOD_FEED, DOWN_FEED]);
        let dataset = collect_articles(&fetcher(), config.feeds(), &config.fetch).await;

        assert_eq!(dataset.feeds_attempted, 2);
        assert_eq!(dataset.feed_failures.len(), 1);
        assert_eq!(dataset.feed_failures[0].feed, DOWN_FEED);

        let urls: Vec<&str> = dataset.articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://news.example/a",
                "https://news.example/b",
                "https://news.example/c"
            ]
        );
        assert_eq!(dataset.succeeded(), 2);
        // `/c` resolves but is not served.
        assert_eq!(
            dataset.articles[2].status.reason(),
            Some("HTTP status 404")
        );
    }

    #[tokio::test]
    async fn test_collect_is_sequential_with_concurrency_one() {
        let mut config = config(&[GOOD_FEED]);
        config.fetch.concurrency = 1;
        let dataset = collect_articles(&fetcher(), config.feeds(), &config.fetch).await;
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.articles[0].url, "https://news.example/a");
    }

    #[tokio::test]
    async fn test_run_with_good_and_down_feed() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&[GOOD_FEED, DOWN_FEED]);
        let summary = run_pipeline(&config, &fetcher(), &options(dir.path()))
            .await
            .unwrap();

        assert_eq!(summary.feeds_attempted, 2);
        assert_eq!(summary.feeds_failed, 1);
        assert_eq!(summary.articles_attempted, 3);
        assert_eq!(summary.articles_succeeded, 2);
        assert_eq!(summary.articles_failed, 1);
        assert_eq!(
            files(dir.path()),
            vec![
                "05_06_25_news.csv",
                "05_06_25_run_report.json",
                "original_wordcloud_05_06_25.svg"
            ]
        );
        assert_eq!(summary.outputs.len(), 3);

        let csv = std::fs::read_to_string(dir.path().join("05_06_25_news.csv")).unwrap();
        assert!(csv.contains("https://news.example/c,failed,HTTP status 404"));
        let svg =
            std::fs::read_to_string(dir.path().join("original_wordcloud_05_06_25.svg")).unwrap();
        assert!(svg.contains(">tariffs</text>"));
    }

    #[tokio::test]
    async fn test_run_with_no_feeds_writes_header_only_csv_and_no_image() {
        let dir = tempfile::tempdir().unwrap();
        let summary = run_pipeline(&config(&[]), &fetcher(), &options(dir.path()))
            .await
            .unwrap();

        assert_eq!(summary.articles_attempted, 0);
        assert_eq!(
            files(dir.path()),
            vec!["05_06_25_news.csv", "05_06_25_run_report.json"]
        );
        let csv = std::fs::read_to_string(dir.path().join("05_06_25_news.csv")).unwrap();
        assert_eq!(csv, "URL,Status,Error,Keywords,Text\n");
    }

    #[tokio::test]
    async fn test_csv_is_identical_across_runs() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let config = config(&[GOOD_FEED, DOWN_FEED]);
        run_pipeline(&config, &fetcher(), &options(a.path())).await.unwrap();
        run_pipeline(&config, &fetcher(), &options(b.path())).await.unwrap();

        let read = |d: &tempfile::TempDir| std::fs::read(d.path().join("05_06_25_news.csv")).unwrap();
        assert_eq!(read(&a), read(&b));
    }

    #[tokio::test]
    async fn test_failed_output_does_not_stop_the_others() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&[GOOD_FEED]);
        let mut broken = config.wordclouds[0].clone();
        broken.name = "masked".to_string();
        broken.mask = Some(dir.path().join("missing_mask.png"));
        config.wordclouds.insert(0, broken);

        let err = run_pipeline(&config, &fetcher(), &options(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Output(OutputError::Image { .. })
        ));
        assert_eq!(
            files(dir.path()),
            vec![
                "05_06_25_news.csv",
                "05_06_25_run_report.json",
                "original_wordcloud_05_06_25.svg"
            ]
        );
    }

    #[test]
    fn test_planned_outputs_follow_config() {
        let mut config = config(&[]);
        assert_eq!(
            planned_outputs(&config),
            vec![
                PlannedOutput::Csv,
                PlannedOutput::Wordcloud(0),
                PlannedOutput::Report
            ]
        );
        config.output.csv = false;
        config.output.report = false;
        assert_eq!(planned_outputs(&config), vec![PlannedOutput::Wordcloud(0)]);
        assert_eq!(
            PlannedOutput::Wordcloud(0).describe(&config),
            "wordcloud 'original_wordcloud'"
        );
    }
}
