//! Data models for one pipeline run.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: One attempted article fetch, successful or not
//! - [`FeedFailure`]: A feed that could not be read
//! - [`RunDataset`]: Everything collected during one run
//! - [`KeywordFrequencies`]: Keyword counts handed to the wordcloud renderer
//! - [`RunSummary`]: Counts and output paths reported at the end of a run

use crate::error::{ArticleFetchError, FeedError};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Outcome of fetching one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FetchStatus {
    Success,
    Failed { reason: String },
}

impl FetchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStatus::Success => "success",
            FetchStatus::Failed { .. } => "failed",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            FetchStatus::Success => None,
            FetchStatus::Failed { reason } => Some(reason),
        }
    }
}

/// A news article as fetched and parsed from a feed-provided URL.
///
/// Failed fetches are kept with empty text and keywords so that the dataset
/// has one entry per attempted URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// The URL the article was fetched from.
    pub url: String,
    /// Headline, when the page exposed one.
    pub title: Option<String>,
    /// Extracted body text, paragraphs separated by blank lines.
    pub text: String,
    /// Extracted keywords, highest ranked first.
    pub keywords: Vec<String>,
    pub status: FetchStatus,
}

impl Article {
    pub fn fetched(url: String, title: Option<String>, text: String, keywords: Vec<String>) -> Self {
        Self {
            url,
            title,
            text,
            keywords,
            status: FetchStatus::Success,
        }
    }

    pub fn failed(url: String, error: &ArticleFetchError) -> Self {
        Self {
            url,
            title: None,
            text: String::new(),
            keywords: Vec::new(),
            status: FetchStatus::Failed {
                reason: error.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == FetchStatus::Success
    }
}

/// A feed that could not be read during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFailure {
    pub feed: String,
    pub reason: String,
}

impl FeedFailure {
    pub fn new(feed: &str, error: &FeedError) -> Self {
        Self {
            feed: feed.to_string(),
            reason: error.to_string(),
        }
    }
}

/// All articles attempted during one run, in discovery order.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RunDataset {
    /// Number of feeds the run attempted to read.
    pub feeds_attempted: usize,
    pub feed_failures: Vec<FeedFailure>,
    pub articles: Vec<Article>,
}

impl RunDataset {
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.articles.iter().filter(|a| a.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// Total number of keywords across all articles.
    pub fn keyword_count(&self) -> usize {
        self.articles.iter().map(|a| a.keywords.len()).sum()
    }

    /// Count how many articles mention each keyword.
    pub fn keyword_frequencies(&self) -> KeywordFrequencies {
        let mut counts = BTreeMap::new();
        for keyword in self.articles.iter().flat_map(|a| a.keywords.iter()) {
            *counts.entry(keyword.clone()).or_insert(0) += 1;
        }
        KeywordFrequencies { counts }
    }
}

/// Keyword → occurrence count, the input of the wordcloud renderer.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordFrequencies {
    counts: BTreeMap<String, usize>,
}

impl KeywordFrequencies {
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        Self {
            counts: counts
                .into_iter()
                .filter(|(_, n)| *n > 0)
                .map(|(k, n)| (k.into(), n))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[cfg(test)]
    pub fn get(&self, keyword: &str) -> usize {
        self.counts.get(keyword).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Keywords by descending count, ties alphabetical.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        self.counts
            .iter()
            .map(|(k, n)| (k.as_str(), *n))
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
            .collect()
    }

    /// The same counts without the given words (compared lowercase).
    pub fn without(&self, stopwords: impl Fn(&str) -> bool) -> Self {
        Self {
            counts: self
                .counts
                .iter()
                .filter(|(k, _)| !stopwords(&k.to_lowercase()))
                .map(|(k, n)| (k.clone(), *n))
                .collect(),
        }
    }
}

/// What a run did, reported at the end and written as the run report.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub date: String,
    pub feeds_attempted: usize,
    pub feeds_failed: usize,
    pub articles_attempted: usize,
    pub articles_succeeded: usize,
    pub articles_failed: usize,
    pub keywords_total: usize,
    pub feed_failures: Vec<FeedFailure>,
    /// `(url, reason)` for every failed article.
    pub article_failures: Vec<(String, String)>,
    pub outputs: Vec<PathBuf>,
}

impl RunSummary {
    pub fn from_dataset(dataset: &RunDataset, date: &str) -> Self {
        Self {
            date: date.to_string(),
            feeds_attempted: dataset.feeds_attempted,
            feeds_failed: dataset.feed_failures.len(),
            articles_attempted: dataset.len(),
            articles_succeeded: dataset.succeeded(),
            articles_failed: dataset.failed(),
            keywords_total: dataset.keyword_count(),
            feed_failures: dataset.feed_failures.clone(),
            article_failures: dataset
                .articles
                .iter()
                .filter_map(|a| a.status.reason().map(|r| (a.url.clone(), r.to_string())))
                .collect(),
            outputs: Vec::new(),
        }
    }
}
