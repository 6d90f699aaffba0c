//! Feed source reader.
//!
//! Downloads an RSS 2.0, RSS 1.0 (RDF) or Atom document and yields the
//! article links it lists. Parsing is done by `feed-rs`; only the entry
//! links are kept.

use crate::error::FeedError;
use crate::http::{Fetch, bounded, parse_http_url};
use feed_rs::model::Entry;
use feed_rs::parser::{self, ParseErrorKind, ParseFeedError};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// The article links of one feed, in document order.
///
/// A single pass: once consumed it cannot be restarted.
#[derive(Debug)]
pub struct FeedLinks {
    feed: String,
    links: std::vec::IntoIter<String>,
}

impl FeedLinks {
    /// The feed these links came from.
    pub fn feed(&self) -> &str {
        &self.feed
    }
}

impl Iterator for FeedLinks {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.links.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.links.size_hint()
    }
}

impl ExactSizeIterator for FeedLinks {}

/// Fetch `feed_url` and return the article links it lists.
///
/// Fails with [`FeedError`] when the URL is invalid, the download fails or
/// times out, or the body is not a well-formed feed. A feed with no items
/// is not an error.
#[instrument(level = "info", skip(fetcher))]
pub async fn read_feed<F: Fetch>(
    fetcher: &F,
    feed_url: &str,
    timeout: Duration,
) -> Result<FeedLinks, FeedError> {
    let base = parse_http_url(feed_url)?;
    let body = bounded(timeout, fetcher.get_text(base.as_str())).await?;
    let links = parse_feed(&body, Some(&base))?;

    info!(count = links.len(), feed = %feed_url, "Indexed feed article URLs");
    debug!(urls = ?links, "Feed URLs");

    Ok(FeedLinks {
        feed: feed_url.to_string(),
        links: links.into_iter(),
    })
}

/// Extract article links from a feed document.
///
/// Relative links are resolved against `base` when given. Items without a
/// usable link are skipped.
pub fn parse_feed(xml: &str, base: Option<&Url>) -> Result<Vec<String>, FeedError> {
    let feed = parser::parse(xml.as_bytes()).map_err(|e| match e {
        ParseFeedError::ParseError(ParseErrorKind::NoFeedRoot) => FeedError::NotAFeed,
        other => FeedError::Xml(other.to_string()),
    })?;

    let mut links = Vec::new();
    for entry in &feed.entries {
        match select_entry_link(entry) {
            Some(href) => push_link(&mut links, href, base),
            None => debug!(id = %entry.id, "Skipping entry without a link"),
        }
    }
    Ok(links)
}

/// Entries may carry several links; prefer `rel="alternate"` (or no `rel`)
/// and fall back to the first non-empty one.
fn select_entry_link(entry: &Entry) -> Option<&str> {
    let usable = || entry.links.iter().filter(|l| !l.href.trim().is_empty());
    usable()
        .find(|l| {
            l.rel
                .as_deref()
                .is_none_or(|r| r.is_empty() || r.eq_ignore_ascii_case("alternate"))
        })
        .or_else(|| usable().next())
        .map(|l| l.href.trim())
}

fn push_link(links: &mut Vec<String>, raw: &str, base: Option<&Url>) {
    if raw.is_empty() {
        return;
    }
    let resolved = match (Url::parse(raw), base) {
        (Ok(url), _) => Some(url),
        (Err(url::ParseError::RelativeUrlWithoutBase), Some(base)) => base.join(raw).ok(),
        _ => None,
    };
    match resolved {
        Some(url) => links.push(url.to_string()),
        // Kept as-is so the fetch attempt records why it is unusable.
        None => links.push(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::http::testing::{HangingFetcher, StaticFetcher};

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>Example News</title>
    <link>https://news.example/</link>
    <atom:link href="https://news.example/rss" rel="self" type="application/rss+xml"/>
    <item>
      <title>First</title>
      <link>https://news.example/2025/05/06/first</link>
    </item>
    <item>
      <title>No link here</title>
    </item>
    <item>
      <title>Second</title>
      <link><![CDATA[https://news.example/2025/05/06/second]]></link>
    </item>
    <item>
      <title>Third</title>
      <link>https://news.example/story?id=3&amp;ref=rss</link>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Atom</title>
  <link href="https://atom.example/" rel="alternate"/>
  <entry>
    <title>One</title>
    <link rel="edit" href="https://atom.example/edit/1"/>
    <link rel="alternate" href="https://atom.example/posts/1"/>
  </entry>
  <entry>
    <title>Two</title>
    <link href="/posts/2"/>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_links() {
        let links = parse_feed(RSS, None).unwrap();
        assert_eq!(
            links,
            vec![
                "https://news.example/2025/05/06/first",
                "https://news.example/2025/05/06/second",
                "https://news.example/story?id=3&ref=rss",
            ]
        );
    }

    #[test]
    fn test_parse_atom_links() {
        let base = Url::parse("https://atom.example/feed.xml").unwrap();
        let links = parse_feed(ATOM, Some(&base)).unwrap();
        assert_eq!(
            links,
            vec!["https://atom.example/posts/1", "https://atom.example/posts/2"]
        );
    }

    #[test]
    fn test_parse_rdf_links() {
        let rdf = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/">
  <channel rdf:about="https://rdf.example/"><link>https://rdf.example/</link></channel>
  <item rdf:about="https://rdf.example/a"><link>https://rdf.example/a</link></item>
</rdf:RDF>"#;
        assert_eq!(parse_feed(rdf, None).unwrap(), vec!["https://rdf.example/a"]);
    }

    #[test]
    fn test_empty_feed_has_no_links() {
        let xml = r#"<rss version="2.0"><channel><title>Quiet</title></channel></rss>"#;
        assert!(parse_feed(xml, None).unwrap().is_empty());
    }

    #[test]
    fn test_html_page_is_not_a_feed() {
        let html = "<html><head><title>Blocked</title></head><body><p>Access denied</p></body></html>";
        assert!(matches!(parse_feed(html, None), Err(FeedError::NotAFeed)));
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let xml = r#"<rss version="2.0"><channel><item><link>https://x.example/</item></channel></rss>"#;
        assert!(matches!(parse_feed(xml, None), Err(FeedError::Xml(_))));
    }

    #[test]
    fn test_entities_in_links_are_decoded_once() {
        let xml = r#"<rss version="2.0"><channel><title>T</title>
  <item><link>https://x.example/?q=a&amp;amp;b</link></item>
  <item><link>https://x.example/?q=a&amp;b</link></item>
</channel></rss>"#;
        assert_eq!(
            parse_feed(xml, None).unwrap(),
            vec!["https://x.example/?q=a&amp;b", "https://x.example/?q=a&b"]
        );
    }

    #[tokio::test]
    async fn test_read_feed_yields_links_once() {
        let fetcher = StaticFetcher::new().page("https://news.example/rss", RSS);
        let mut links = read_feed(&fetcher, "https://news.example/rss", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(links.feed(), "https://news.example/rss");
        assert_eq!(links.len(), 3);
        assert_eq!(links.by_ref().count(), 3);
        assert_eq!(links.next(), None);
    }

    #[tokio::test]
    async fn test_read_feed_unreachable() {
        let fetcher = StaticFetcher::new().down("https://down.example/rss");
        let err = read_feed(&fetcher, "https://down.example/rss", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Unavailable(FetchError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_read_feed_invalid_url() {
        let fetcher = StaticFetcher::new();
        let err = read_feed(&fetcher, "not-a-url", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Unavailable(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_read_feed_hanging_server_is_bounded() {
        let err = read_feed(
            &HangingFetcher,
            "https://slow.example/rss",
            Duration::from_millis(50),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FeedError::Unavailable(FetchError::Timeout(_))));
    }
}
