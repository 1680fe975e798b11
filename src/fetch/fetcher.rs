//! HTTP fetcher implementation
//!
//! Retry behavior:
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Connect error | Retry after the configured delay |
//! | Timeout | Retry after the configured delay |
//! | Non-2xx status | Retry after the configured delay |
//! | Body read error | Retry after the configured delay |
//! | Attempts exhausted | Log at warn, return [`Fetched::Empty`] |
//!
//! No error class is excluded from retry, and no error escapes this module.
//! Callers must be able to operate on an empty document: selector queries
//! against it yield zero matches.

use crate::config::FetchConfig;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;

/// Result of a fetch: page content, or nothing after retries ran out
///
/// The empty case is a value, not an error, so it is visible in signatures
/// and callers cannot forget to handle it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// Raw response body
    Content(String),
    /// All attempts failed; treat as a page with nothing on it
    Empty,
}

impl Fetched {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Parses the content into a queryable document
    ///
    /// [`Fetched::Empty`] parses the empty string: the resulting document is
    /// valid and every selector query over it returns zero matches.
    pub fn to_document(&self) -> Html {
        match self {
            Self::Content(body) => Html::parse_document(body),
            Self::Empty => Html::parse_document(""),
        }
    }
}

/// Builds the HTTP client shared by all fetches of a crawl
///
/// The timeout applies per request, so every retry attempt gets a fresh one.
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("shopcrawl/", env!("CARGO_PKG_VERSION")))
        .timeout(config.timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with bounded retry and degrade-not-fail semantics
pub struct PageFetcher {
    client: Client,
    attempts: u32,
    retry_delay: Duration,
}

impl PageFetcher {
    /// Creates a fetcher from an explicit retry configuration
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            attempts: config.retry_attempts,
            retry_delay: config.retry_delay(),
        })
    }

    /// Fetches raw page content, retrying up to the attempt ceiling
    ///
    /// Returns [`Fetched::Empty`] once all attempts fail. The failure is
    /// logged; it is never surfaced as an error.
    pub async fn fetch_raw(&self, url: &str) -> Fetched {
        for attempt in 1..=self.attempts {
            match self.try_fetch(url).await {
                Ok(body) => return Fetched::Content(body),
                Err(e) => {
                    tracing::warn!(
                        "Fetch attempt {}/{} failed for {}: {}",
                        attempt,
                        self.attempts,
                        url,
                        e
                    );
                    if attempt < self.attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        tracing::warn!("Giving up on {} after {} attempts", url, self.attempts);
        Fetched::Empty
    }

    /// Fetches a URL and parses it into a queryable document
    ///
    /// On exhausted retries the document is parsed from the empty string, so
    /// extraction over it finds nothing rather than failing.
    pub async fn fetch_document(&self, url: &str) -> Html {
        self.fetch_raw(url).await.to_document()
    }

    /// A single fetch attempt; any error here triggers a retry
    async fn try_fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        tracing::debug!("Http request: {}", url);
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        response.text().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    fn test_config() -> FetchConfig {
        FetchConfig {
            retry_attempts: 3,
            retry_delay_ms: 1,
            timeout_secs: 5,
        }
    }

    #[test]
    fn builds_client() {
        assert!(build_http_client(&test_config()).is_ok());
    }

    #[test]
    fn empty_fetch_yields_queryable_document() {
        let document = Fetched::Empty.to_document();
        let selector = Selector::parse(".product-item").unwrap();
        assert_eq!(document.select(&selector).count(), 0);
    }

    #[test]
    fn content_fetch_yields_parsed_document() {
        let fetched = Fetched::Content(
            "<html><body><div class='product-item'>x</div></body></html>".to_string(),
        );
        let document = fetched.to_document();
        let selector = Selector::parse(".product-item").unwrap();
        assert_eq!(document.select(&selector).count(), 1);
    }

    // Retry behavior against a live socket is covered by tests/fetcher_tests.rs
    // with wiremock.
}
