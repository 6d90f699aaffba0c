//! # news_wordcloud
//!
//! A batch pipeline that reads a configured list of RSS/Atom feeds, downloads
//! every linked article, extracts its keywords, and writes a dated CSV
//! archive, a JSON run report, and one wordcloud image per configured style.
//!
//! ## Architecture
//!
//! 1. **Indexing**: read each feed and collect its article links ([`feeds`])
//! 2. **Fetching**: download and parse every article ([`scrapers::article`])
//! 3. **Keywords**: rank the words of each article ([`nlp`])
//! 4. **Output**: CSV, report and wordclouds ([`outputs`])
//!
//! [`pipeline`] strings the stages together; [`interactive`] runs them one
//! at a time. A feed or article that fails is recorded and skipped, never
//! fatal.

pub mod cli;
pub mod config;
pub mod error;
pub mod feeds;
pub mod http;
pub mod interactive;
pub mod models;
pub mod nlp;
pub mod outputs;
pub mod pipeline;
pub mod scrapers;
pub mod stopwords;
pub mod utils;
