//! Article scraping.
//!
//! Scraping follows a two-phase pattern:
//!
//! 1. **Indexing**: article URLs come from the configured feeds
//!    (see [`crate::feeds`])
//! 2. **Fetching**: each URL is downloaded and parsed into an
//!    [`Article`](crate::models::Article) by [`article`]
//!
//! Fetching never fails as a whole. A page that cannot be downloaded or
//! yields no text becomes a failed `Article` carrying the reason, and the
//! batch moves on.

pub mod article;
