//! # news_wordcloud
//!
//! Reads the feeds listed in `feeds.yaml`, fetches every linked article, and
//! writes a dated CSV archive, a JSON run report and wordcloud images.
//!
//! ## Usage
//!
//! ```sh
//! news_wordcloud                 # same as `news_wordcloud run`
//! news_wordcloud step            # pause between stages
//! RUST_LOG=debug news_wordcloud --config feeds.yaml --output-dir out
//! ```

use chrono::Local;
use clap::Parser;
use news_wordcloud::cli::{Cli, Command};
use news_wordcloud::config::load_config;
use news_wordcloud::http::HttpFetcher;
use news_wordcloud::interactive::step_through;
use news_wordcloud::pipeline::{RunOptions, run_pipeline};
use std::error::Error;
use tokio::io::BufReader;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_wordcloud starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Load config ----
    let mut config = match load_config(&args.config).await {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return Err(Box::new(e) as Box<dyn Error>);
        }
    };
    args.apply(&mut config);
    config.validate()?;
    let fetcher = HttpFetcher::new(&config.fetch)?;

    let options = RunOptions {
        output_dir: args.output_dir.clone(),
        date: args.date.unwrap_or_else(|| Local::now().date_naive()),
    };
    info!(
        command = ?args.selected_command(),
        output_dir = %options.output_dir.display(),
        date = %options.date,
        "Starting run"
    );

    let result = match args.selected_command() {
        Command::Run => run_pipeline(&config, &fetcher, &options).await,
        Command::Step => {
            let stdin = BufReader::new(tokio::io::stdin());
            step_through(&config, &fetcher, &options, stdin, tokio::io::stdout()).await
        }
    };

    let elapsed = start_time.elapsed();
    match result {
        Ok(summary) => {
            println!(
                "feeds: {} succeeded, {} failed | articles: {} succeeded, {} failed",
                summary.feeds_attempted - summary.feeds_failed,
                summary.feeds_failed,
                summary.articles_succeeded,
                summary.articles_failed
            );
            for path in &summary.outputs {
                println!("wrote {}", path.display());
            }
            info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, ?elapsed, "Run failed");
            Err(Box::new(e) as Box<dyn Error>)
        }
    }
}
