//! Generic news article scraper.
//!
//! Works on arbitrary news sites rather than a single outlet. The body text
//! comes from the element that scores best under Readability-style paragraph
//! scoring, which skips navigation, captions and footers on most article
//! layouts without per-site selectors.

use crate::error::ArticleFetchError;
use crate::http::{Fetch, bounded, parse_http_url};
use crate::models::Article;
use crate::nlp::extract_keywords;
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).expect("valid selector"));
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("valid selector"));
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("valid selector"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("valid selector"));

/// Title and body text pulled out of an article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: Option<String>,
    pub text: String,
}

/// Fetch all articles with at most `concurrency` downloads in flight.
///
/// The result has exactly one entry per input URL, in input order, whether
/// or not the fetch succeeded.
#[instrument(level = "info", skip_all, fields(count = urls.len()))]
pub async fn fetch_articles<F: Fetch>(
    fetcher: &F,
    urls: Vec<String>,
    timeout: Duration,
    concurrency: usize,
) -> Vec<Article> {
    let articles: Vec<Article> = stream::iter(urls)
        .map(|url| async move { fetch_article(fetcher, &url, timeout).await })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let ok = articles.iter().filter(|a| a.is_success()).count();
    info!(
        total = articles.len(),
        succeeded = ok,
        failed = articles.len() - ok,
        "Fetched article contents"
    );
    articles
}

/// Fetch and parse a single article. Failures are returned as a failed
/// [`Article`], never as an error.
#[instrument(level = "info", skip(fetcher, timeout))]
pub async fn fetch_article<F: Fetch>(fetcher: &F, url: &str, timeout: Duration) -> Article {
    match try_fetch_article(fetcher, url, timeout).await {
        Ok(article) => {
            debug!(%url, keywords = article.keywords.len(), "Fetched article");
            article
        }
        Err(e) => {
            warn!(%url, error = %e, "Article fetch failed; recording failure");
            Article::failed(url.to_string(), &e)
        }
    }
}

async fn try_fetch_article<F: Fetch>(
    fetcher: &F,
    url: &str,
    timeout: Duration,
) -> Result<Article, ArticleFetchError> {
    let parsed = parse_http_url(url)?;
    let html = bounded(timeout, fetcher.get_text(parsed.as_str())).await?;

    let page = extract_page(&html);
    let keywords = extract_keywords(page.title.as_deref(), &page.text);
    if page.text.is_empty() || keywords.is_empty() {
        return Err(ArticleFetchError::NoContent);
    }

    info!(bytes = page.text.len(), keywords = keywords.len(), "Parsed article");
    Ok(Article::fetched(url.to_string(), page.title, page.text, keywords))
}

/// Extract the headline and body text from an HTML document.
pub fn extract_page(html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);
    ExtractedPage {
        title: extract_title(&document),
        text: extract_text(&document),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let og = document
        .select(&OG_TITLE)
        .filter_map(|e| e.value().attr("content"))
        .map(normalize_whitespace)
        .find(|t| !t.is_empty());

    og.or_else(|| {
        document
            .select(&TITLE)
            .chain(document.select(&H1))
            .map(|e| normalize_whitespace(&e.text().collect::<String>()))
            .find(|t| !t.is_empty())
    })
}

/// Elements whose paragraphs are never article text.
const BOILERPLATE: &[&str] = &[
    "nav", "header", "footer", "aside", "figure", "figcaption", "script", "style", "noscript",
    "button",
];

/// Readability-style score of one paragraph: a base point, one per comma,
/// and up to three for length.
fn paragraph_score(text: &str) -> f32 {
    1.0 + text.matches(',').count() as f32 + (text.len() / 100).min(3) as f32
}

fn in_boilerplate(p: &ElementRef<'_>) -> bool {
    p.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| BOILERPLATE.contains(&a.value().name()))
}

/// Body text of the article, paragraphs separated by a blank line.
///
/// Each paragraph credits its score to its parent in full, its grandparent
/// by half and its great-grandparent by a third. The best scoring element
/// wins, together with any sibling scoring at least a fifth of it, so
/// layouts that wrap every paragraph in its own block keep all of them.
fn extract_text(document: &Html) -> String {
    let mut order = Vec::new();
    let mut scores: HashMap<_, f32> = HashMap::new();

    for p in document.select(&PARAGRAPH) {
        if in_boilerplate(&p) {
            continue;
        }
        let text = normalize_whitespace(&p.text().collect::<String>());
        if text.is_empty() {
            continue;
        }
        let score = paragraph_score(&text);
        let ancestors = p
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take_while(|a| a.value().name() != "html")
            .take(3);
        for (level, ancestor) in ancestors.enumerate() {
            let entry = scores.entry(ancestor.id()).or_insert_with(|| {
                order.push(ancestor);
                0.0
            });
            *entry += score / (level + 1) as f32;
        }
    }

    let mut top: Option<(ElementRef<'_>, f32)> = None;
    for candidate in &order {
        let score = scores[&candidate.id()];
        if top.is_none_or(|(_, best)| score > best) {
            top = Some((*candidate, score));
        }
    }
    let Some((top, top_score)) = top else {
        return String::new();
    };

    let threshold = top_score * 0.2;
    let containers: Vec<ElementRef<'_>> = match top.parent() {
        Some(parent) => parent
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|e| {
                e.id() == top.id() || scores.get(&e.id()).is_some_and(|s| *s >= threshold)
            })
            .collect(),
        None => vec![top],
    };
    debug!(
        element = top.value().name(),
        score = top_score,
        containers = containers.len(),
        "Selected article container"
    );

    containers
        .iter()
        .flat_map(|c| c.select(&PARAGRAPH))
        .filter(|p| !in_boilerplate(p))
        .map(|p| normalize_whitespace(&p.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{HangingFetcher, StaticFetcher};
    use crate::models::FetchStatus;
    use std::time::Instant;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Harbor strike | Example News</title>
  <meta property="og:title" content="Harbor strike enters second week">
</head>
<body>
  <nav><p>Home</p><p>World</p></nav>
  <article>
    <h1>Harbor strike enters second week</h1>
    <p>Dock workers extended their strike on Monday, leaving cargo ships idle.</p>
    <p>The strike has slowed cargo deliveries across the region, and shipping
       companies warned of further delays.</p>
    <figure><p>Photo: cranes at rest.</p></figure>
  </article>
  <footer><p>© Example News</p></footer>
</body>
</html>"#;

    #[test]
    fn test_extract_page_picks_article_body() {
        let page = extract_page(PAGE);
        assert_eq!(page.title.as_deref(), Some("Harbor strike enters second week"));
        assert!(page.text.starts_with("Dock workers extended their strike"));
        assert!(page.text.contains("\n\nThe strike has slowed cargo deliveries across the region, and shipping companies"));
        assert!(!page.text.contains("Home"));
        assert!(!page.text.contains("cranes"));
        assert!(!page.text.contains("©"));
    }

    #[test]
    fn test_extract_page_keeps_paragraphs_wrapped_one_per_block() {
        let page = extract_page(
            r#"<html><body>
  <nav><p>Home</p></nav>
  <article>
    <div><p>Dock workers extended their strike on Monday, leaving cargo ships idle.</p></div>
    <div><p>The strike has slowed cargo deliveries across the region, and shipping companies warned of delays.</p></div>
    <div><p>Union leaders said talks would resume on Thursday.</p></div>
  </article>
</body></html>"#,
        );
        assert!(page.text.starts_with("Dock workers extended their strike"));
        assert!(page.text.contains("\n\nThe strike has slowed cargo deliveries"));
        assert!(page.text.ends_with("Union leaders said talks would resume on Thursday."));
        assert!(!page.text.contains("Home"));
    }

    #[test]
    fn test_extract_page_keeps_sibling_sections() {
        let page = extract_page(
            r#"<html><body><main>
  <section><p>Dock workers extended their strike on Monday, leaving cargo ships idle.</p>
    <p>Port officials, shippers, and retailers braced for more delays.</p></section>
  <section><p>Union leaders, meeting on Sunday, said talks would resume.</p></section>
  <aside><p>Most read: weather, sport, markets.</p></aside>
</main></body></html>"#,
        );
        assert!(page.text.starts_with("Dock workers"));
        assert!(page.text.contains("Union leaders"));
        assert!(!page.text.contains("Most read"));
    }

    #[test]
    fn test_paragraphs_directly_in_body_are_kept() {
        let page = extract_page("<html><body><p>Only paragraph.</p></body></html>");
        assert_eq!(page.text, "Only paragraph.");
    }

    #[test]
    fn test_extract_title_falls_back_to_title_tag() {
        let page = extract_page("<html><head><title> Plain  title </title></head><body><p>x</p></body></html>");
        assert_eq!(page.title.as_deref(), Some("Plain title"));
    }

    #[test]
    fn test_extract_page_without_paragraphs() {
        let page = extract_page("<html><body><div>Access denied</div></body></html>");
        assert!(page.text.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_article_success() {
        let url = "https://news.example/harbor";
        let fetcher = StaticFetcher::new().page(url, PAGE);
        let article = fetch_article(&fetcher, url, Duration::from_secs(1)).await;
        assert!(article.is_success());
        assert_eq!(article.url, url);
        assert_eq!(article.keywords[..2], ["cargo", "strike"]);
        assert!(article.keywords.contains(&"harbor".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_article_http_error_is_recorded() {
        let fetcher = StaticFetcher::new();
        let article = fetch_article(&fetcher, "https://news.example/gone", Duration::from_secs(1)).await;
        assert_eq!(
            article.status,
            FetchStatus::Failed {
                reason: "HTTP status 404".to_string()
            }
        );
        assert!(article.text.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_article_blocked_page_is_recorded() {
        let url = "https://news.example/blocked";
        let fetcher = StaticFetcher::new().page(url, "<html><body><div>Please enable JavaScript</div></body></html>");
        let article = fetch_article(&fetcher, url, Duration::from_secs(1)).await;
        assert_eq!(article.status.reason(), Some("no article text could be extracted"));
    }

    #[tokio::test]
    async fn test_fetch_article_malformed_url_is_recorded() {
        let fetcher = StaticFetcher::new();
        let article = fetch_article(&fetcher, "javascript:void(0)", Duration::from_secs(1)).await;
        assert!(!article.is_success());
        assert_eq!(article.url, "javascript:void(0)");
    }

    #[tokio::test]
    async fn test_fetch_article_timeout_is_bounded() {
        let timeout = Duration::from_millis(50);
        let t0 = Instant::now();
        let article = fetch_article(&HangingFetcher, "https://slow.example/a", timeout).await;
        assert!(t0.elapsed() < Duration::from_secs(5));
        assert!(article.status.reason().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_fetch_articles_keeps_order_and_failures() {
        let fetcher = StaticFetcher::new()
            .page("https://news.example/1", PAGE)
            .page("https://news.example/3", PAGE);
        let urls = vec![
            "https://news.example/1".to_string(),
            "https://news.example/2".to_string(),
            "https://news.example/3".to_string(),
        ];
        let articles = fetch_articles(&fetcher, urls.clone(), Duration::from_secs(1), 2).await;
        assert_eq!(articles.iter().map(|a| a.url.clone()).collect::<Vec<_>>(), urls);
        assert!(articles[0].is_success());
        assert!(!articles[1].is_success());
        assert!(articles[2].is_success());
    }
}
