//! HTTP transport used by the feed reader and the article fetcher.
//!
//! [`Fetch`] is the seam between the pipeline and the network. Production
//! code uses [`HttpFetcher`]; tests plug in in-memory implementations.

use crate::config::FetchSettings;
use crate::error::{ConfigError, FetchError};
use reqwest::{Client, Proxy, redirect};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Download a URL as text.
///
/// Implementations should return [`FetchError::Status`] for non-2xx
/// responses. Callers wrap every call in [`bounded`], so an implementation
/// that never returns still cannot stall the batch.
pub trait Fetch {
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

impl<T: Fetch> Fetch for &T {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        (**self).get_text(url).await
    }
}

/// [`Fetch`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client from the fetch settings.
    ///
    /// Proxies from `HTTP_PROXY`/`HTTPS_PROXY` are honoured by `reqwest`; an
    /// explicit `proxy` setting takes precedence.
    pub fn new(settings: &FetchSettings) -> Result<Self, ConfigError> {
        let mut builder = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout())
            .connect_timeout(settings.timeout())
            .redirect(redirect::Policy::limited(10));

        if let Some(proxy) = &settings.proxy {
            builder = builder.proxy(Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Non-success HTTP status");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        debug!(
            %url,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Downloaded"
        );
        Ok(body)
    }
}

/// Run a fetch with a hard upper bound on its duration.
pub async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(res) => res,
        Err(_) => Err(FetchError::Timeout(timeout)),
    }
}

/// Parse and check an http(s) URL.
pub fn parse_http_url(raw: &str) -> Result<url::Url, FetchError> {
    let trimmed = raw.trim();
    match url::Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(url),
        _ => Err(FetchError::InvalidUrl(trimmed.to_string())),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::HangingFetcher;
    use super::*;

    #[test]
    fn test_parse_http_url() {
        assert!(parse_http_url("https://example.com/rss").is_ok());
        assert!(parse_http_url("  http://example.com/feed.xml \n").is_ok());
        assert!(matches!(
            parse_http_url("not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_http_url("ftp://example.com/rss"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_http_url("mailto:news@example.com"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let timeout = Duration::from_millis(50);
        let t0 = Instant::now();
        let res = bounded(timeout, HangingFetcher.get_text("https://slow.example/")).await;
        assert!(matches!(res, Err(FetchError::Timeout(d)) if d == timeout));
        assert!(t0.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_bounded_passes_through() {
        let res = bounded(Duration::from_secs(1), async { Ok::<_, FetchError>(7) }).await;
        assert_eq!(res.unwrap(), 7);
    }

    #[test]
    fn test_http_fetcher_rejects_bad_proxy() {
        let settings = FetchSettings {
            proxy: Some("::not a proxy::".to_string()),
            ..FetchSettings::default()
        };
        assert!(HttpFetcher::new(&settings).is_err());
    }
}
