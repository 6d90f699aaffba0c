//! Command-line interface definitions for news_wordcloud.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Fetch overrides can also come from environment variables.

use crate::config::Config;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for news_wordcloud.
///
/// # Examples
///
/// ```sh
/// # Read feeds.yaml in the current directory and write outputs here
/// news_wordcloud
///
/// # Another config, output directory and date
/// news_wordcloud --config ~/news/feeds.yaml -o ~/news/out --date 2025-05-06 run
///
/// # Pause after each stage
/// news_wordcloud step
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the YAML configuration file
    #[arg(short, long, global = true, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Directory for the CSV, report and wordcloud files
    #[arg(short, long, global = true, default_value = ".")]
    pub output_dir: PathBuf,

    /// Date used in output file names (YYYY-MM-DD, default today)
    #[arg(short, long, global = true)]
    pub date: Option<NaiveDate>,

    /// Skip the CSV archive
    #[arg(long, global = true)]
    pub no_csv: bool,

    /// Per-request timeout in seconds, overriding `fetch.timeout_secs`
    #[arg(long, global = true, env = "NEWS_WORDCLOUD_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    /// Proxy URL for all requests, overriding `fetch.proxy`
    #[arg(long, global = true, env = "NEWS_WORDCLOUD_PROXY")]
    pub proxy: Option<String>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Run every stage without stopping (default)
    #[default]
    Run,
    /// Pause after each stage and wait for Enter
    Step,
}

impl Cli {
    pub fn selected_command(&self) -> Command {
        self.command.unwrap_or_default()
    }

    /// Apply command-line overrides to a loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if self.no_csv {
            config.output.csv = false;
        }
        if let Some(timeout) = self.timeout {
            config.fetch.timeout_secs = timeout;
        }
        if let Some(proxy) = &self.proxy {
            config.fetch.proxy = Some(proxy.clone());
        }
    }
}
