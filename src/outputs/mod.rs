//! Output generation for one run.
//!
//! # Submodules
//!
//! - [`csv`]: Dated CSV archive, one row per attempted article
//! - [`json`]: JSON run report with counts and failures
//! - [`wordcloud`]: Wordcloud images from keyword frequencies
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── 05_06_25_news.csv
//! ├── 05_06_25_run_report.json
//! ├── original_wordcloud_05_06_25.svg
//! └── tree_wordcloud_05_06_25.svg
//! ```

pub mod csv;
pub mod json;
pub mod wordcloud;
