//! Crawl engine
//!
//! This module contains the traversal shared by every site strategy:
//! category discovery, windowed pagination with bounded concurrency,
//! optional enrichment, and per-window batch persistence.

mod orchestrator;
mod windows;

pub use orchestrator::{BatchConfig, CatalogCrawler, CrawlSummary};
pub use windows::page_windows;

use crate::config::Config;
use crate::fetch::PageFetcher;
use crate::items::Source;
use crate::sites::{RozetkaSite, TelemartSite};
use crate::storage::SqliteStore;
use crate::CrawlError;
use std::path::Path;

/// Runs a complete crawl of one source against the configured database
///
/// This is the trigger surface behind the CLI: it wires the fetcher, the
/// store, and the strategy for the requested source, then runs the engine
/// to completion. The crawl itself cannot fail past this point; failures
/// inside it degrade or are caught at category boundaries and show up in
/// logs only.
///
/// # Arguments
///
/// * `config` - Validated application configuration
/// * `source` - Which catalog site to crawl
/// * `full_load` - Whether to run per-item enrichment
pub async fn run_crawl(config: &Config, source: Source, full_load: bool) -> Result<CrawlSummary, CrawlError> {
    let fetcher = PageFetcher::new(&config.fetch)?;
    let sink = SqliteStore::open(Path::new(&config.output.database_path))?;
    let batches = BatchConfig::from(&config.crawler);
    let base_url = config.sources.base_url(source).to_string();

    let summary = match source {
        Source::Rozetka => {
            CatalogCrawler::new(RozetkaSite::new(base_url), fetcher, sink, batches)
                .run(full_load)
                .await
        }
        Source::Telemart => {
            CatalogCrawler::new(TelemartSite::new(base_url), fetcher, sink, batches)
                .run(full_load)
                .await
        }
    };

    Ok(summary)
}
