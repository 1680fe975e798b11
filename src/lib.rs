//! Shopcrawl: an e-commerce catalog crawler
//!
//! This crate crawls external store catalogs, extracts structured product
//! records from HTML, and persists them incrementally in batches. Two site
//! strategies (Rozetka and Telemart) share a single traversal engine.

pub mod config;
pub mod crawler;
pub mod fetch;
pub mod items;
pub mod sites;
pub mod storage;

use thiserror::Error;

/// Main error type for shopcrawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for shopcrawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, CatalogCrawler};
pub use fetch::{Fetched, PageFetcher};
pub use items::{Category, Item, Source, Specifications};
pub use sites::{RozetkaSite, SiteStrategy, TelemartSite};
