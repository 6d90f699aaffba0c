//! Step-through mode.
//!
//! Runs the same stages as [`run_pipeline`](crate::pipeline::run_pipeline)
//! but prints what each stage produced and waits for the operator before
//! going on. An empty line continues, `q` stops. End of input continues, so
//! piping `/dev/null` behaves like a plain run.

use crate::config::Config;
use crate::error::{OutputError, PipelineError};
use crate::http::Fetch;
use crate::models::RunSummary;
use crate::pipeline::{self, RunOptions};
use crate::utils::{ensure_writable_dir, truncate_for_log};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info, instrument};

/// Number of top keywords shown after extraction.
const TOP_KEYWORDS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Continue,
    Quit,
}

/// Drives the operator conversation.
struct Prompt<R, W> {
    input: R,
    out: W,
}

impl<R, W> Prompt<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn say(&mut self, text: &str) -> Result<(), OutputError> {
        self.out
            .write_all(text.as_bytes())
            .await
            .map_err(OutputError::Console)?;
        self.out.flush().await.map_err(OutputError::Console)
    }

    async fn ask(&mut self) -> Result<Answer, OutputError> {
        self.say("Press Enter to continue, q to quit: ").await?;
        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .await
            .map_err(OutputError::Console)?;
        Ok(match line.trim() {
            "q" | "Q" | "quit" => Answer::Quit,
            _ => Answer::Continue,
        })
    }
}

/// Run the pipeline one stage at a time.
///
/// Returns the summary of whatever was done, including when the operator
/// quits early. Output errors are reported and the first one is returned at
/// the end, as in a normal run.
#[instrument(level = "info", skip_all, fields(date = %options.date))]
pub async fn step_through<F, R, W>(
    config: &Config,
    fetcher: &F,
    options: &RunOptions,
    input: R,
    out: W,
) -> Result<RunSummary, PipelineError>
where
    F: Fetch,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    ensure_writable_dir(&options.output_dir).await?;
    let mut prompt = Prompt { input, out };
    let stamp = options.date_stamp();

    // Feeds
    let discovery = pipeline::discover(fetcher, config.feeds(), &config.fetch).await;
    let mut text = format!(
        "\n== Feeds: {} read, {} failed, {} article links\n",
        discovery.feeds_attempted - discovery.feed_failures.len(),
        discovery.feed_failures.len(),
        discovery.links.len()
    );
    for failure in &discovery.feed_failures {
        text.push_str(&format!("   failed {}: {}\n", failure.feed, failure.reason));
    }
    prompt.say(&text).await?;
    if prompt.ask().await? == Answer::Quit {
        return Ok(stopped(RunSummary {
            date: stamp,
            feeds_attempted: discovery.feeds_attempted,
            feeds_failed: discovery.feed_failures.len(),
            feed_failures: discovery.feed_failures,
            ..RunSummary::default()
        }));
    }

    // Articles
    let dataset = pipeline::fetch_discovered(fetcher, discovery, &config.fetch).await;
    let mut summary = RunSummary::from_dataset(&dataset, &stamp);
    let mut text = format!(
        "\n== Articles: {} fetched, {} failed\n",
        dataset.succeeded(),
        dataset.failed()
    );
    if let Some(first) = dataset.articles.iter().find(|a| a.is_success()) {
        text.push_str(&format!(
            "   e.g. {}: {}\n",
            first.url,
            truncate_for_log(&first.text.replace('\n', " "), 120)
        ));
    }
    prompt.say(&text).await?;
    if prompt.ask().await? == Answer::Quit {
        return Ok(stopped(summary));
    }

    // Keywords
    let frequencies = dataset.keyword_frequencies();
    let top = frequencies
        .ranked()
        .into_iter()
        .take(TOP_KEYWORDS)
        .map(|(word, n)| format!("{word} ({n})"))
        .collect::<Vec<_>>()
        .join(", ");
    prompt
        .say(&format!(
            "\n== Keywords: {} distinct, {} total\n   {top}\n",
            frequencies.len(),
            frequencies.total()
        ))
        .await?;

    // Outputs
    let mut first_error: Option<OutputError> = None;
    for output in pipeline::planned_outputs(config) {
        if prompt.ask().await? == Answer::Quit {
            return match first_error {
                Some(e) => Err(e.into()),
                None => Ok(stopped(summary)),
            };
        }
        let line = match pipeline::write_output(output, config, &dataset, &summary, options).await
        {
            Ok(Some(path)) => {
                let line = format!("\n== Wrote {}: {}\n", output.describe(config), path.display());
                summary.outputs.push(path);
                line
            }
            Ok(None) => format!("\n== Skipped {}: nothing to draw\n", output.describe(config)),
            Err(e) => {
                error!(%output, error = %e, "Failed to write output");
                let line = format!("\n== Failed {}: {e}\n", output.describe(config));
                first_error.get_or_insert(e);
                line
            }
        };
        prompt.say(&line).await?;
    }

    pipeline::log_summary(&summary);
    prompt
        .say(&format!(
            "\nDone: {} of {} feeds, {} of {} articles, {} files written\n",
            summary.feeds_attempted - summary.feeds_failed,
            summary.feeds_attempted,
            summary.articles_succeeded,
            summary.articles_attempted,
            summary.outputs.len()
        ))
        .await?;
    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(summary),
    }
}

fn stopped(summary: RunSummary) -> RunSummary {
    info!("Stopped by operator");
    summary
}
