use crate::items::Source;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for shopcrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetch: FetchConfig,
    pub sources: SourcesConfig,
    pub output: OutputConfig,
}

/// Batch sizing for the crawl traversal
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// How many listing pages are fetched concurrently per window
    #[serde(rename = "page-batch-size")]
    pub page_batch_size: u32,

    /// How many items are enriched concurrently per sub-window
    #[serde(rename = "item-batch-size")]
    pub item_batch_size: u32,
}

/// HTTP fetch and retry behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Total attempts per URL before giving up
    #[serde(rename = "retry-attempts")]
    pub retry_attempts: u32,

    /// Fixed delay between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Per-request timeout (seconds); resets on every retry
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Base URLs of the supported catalog sites
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(rename = "rozetka-base-url")]
    pub rozetka_base_url: String,

    #[serde(rename = "telemart-base-url")]
    pub telemart_base_url: String,
}

impl SourcesConfig {
    /// Returns the configured base URL for a source
    pub fn base_url(&self, source: Source) -> &str {
        match source {
            Source::Rozetka => &self.rozetka_base_url,
            Source::Telemart => &self.telemart_base_url,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}
