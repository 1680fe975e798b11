//! Crawl orchestration
//!
//! One traversal shared by every site strategy:
//!
//! 1. Discover categories (the only unbounded fan-out, see
//!    [`SiteStrategy::discover_categories`]).
//! 2. Walk categories sequentially. Each category runs inside a
//!    catch-and-continue boundary: an error is logged and the crawl moves
//!    on to the next category.
//! 3. Paginated categories are traversed in consecutive page windows; the
//!    pages of a window are fetched concurrently and their items flattened
//!    in window order.
//! 4. With full load, items are enriched in concurrent sub-windows; one
//!    item's failure never touches its siblings.
//! 5. Each window is persisted as one batch before the next window starts,
//!    so peak memory is one window's items and a crash loses at most the
//!    batch in flight.

use crate::crawler::windows::page_windows;
use crate::fetch::PageFetcher;
use crate::items::{Category, Item};
use crate::sites::SiteStrategy;
use crate::storage::ItemSink;
use crate::CrawlError;
use futures::future::join_all;

/// Window sizes bounding in-flight work
#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    /// Listing pages fetched concurrently per window
    pub pages_per_window: u32,
    /// Items enriched concurrently per sub-window
    pub items_per_window: usize,
}

impl BatchConfig {
    pub fn new(pages_per_window: u32, items_per_window: u32) -> Self {
        Self {
            pages_per_window,
            items_per_window: items_per_window.max(1) as usize,
        }
    }
}

impl From<&crate::config::CrawlerConfig> for BatchConfig {
    fn from(config: &crate::config::CrawlerConfig) -> Self {
        Self::new(config.page_batch_size, config.item_batch_size)
    }
}

/// What a finished crawl did, for the completion log line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub categories: usize,
    pub items_saved: u64,
}

/// The shared crawl engine, parameterized by a site strategy and a sink
pub struct CatalogCrawler<S, K> {
    strategy: S,
    fetcher: PageFetcher,
    sink: K,
    batches: BatchConfig,
}

impl<S: SiteStrategy, K: ItemSink> CatalogCrawler<S, K> {
    pub fn new(strategy: S, fetcher: PageFetcher, sink: K, batches: BatchConfig) -> Self {
        Self {
            strategy,
            fetcher,
            sink,
            batches,
        }
    }

    /// Runs a full crawl of the strategy's site
    ///
    /// Never fails: every category is processed inside its own error
    /// boundary, and fetch failures degrade to empty pages well before this
    /// level. Failures are observable through logs only.
    pub async fn run(&self, full_load: bool) -> CrawlSummary {
        let source = self.strategy.source();
        let categories = self.strategy.discover_categories(&self.fetcher).await;
        tracing::info!("Found {} categories for {}", categories.len(), source);
        tracing::info!(
            "Start parsing categories {} full load",
            if full_load { "with" } else { "without" }
        );

        let mut summary = CrawlSummary {
            categories: categories.len(),
            ..CrawlSummary::default()
        };

        for category in &categories {
            match self.crawl_category(category, full_load).await {
                Ok(saved) => summary.items_saved += saved,
                Err(e) => {
                    tracing::warn!("Parsing error for category {}: {}", category.link, e);
                }
            }
        }

        tracing::info!(
            "Crawl of {} finished: {} categories, {} items saved",
            source,
            summary.categories,
            summary.items_saved
        );
        summary
    }

    /// Processes one category; the caller catches whatever this returns
    async fn crawl_category(
        &self,
        category: &Category,
        full_load: bool,
    ) -> Result<u64, CrawlError> {
        tracing::info!("Parsing category by link: {}", category.link);
        let label = self.strategy.category_label(&category.link);

        let first_doc = self.fetcher.fetch_document(&category.link).await;
        let pages = self.strategy.count_pages(&first_doc);

        let Some(pages) = pages else {
            // no pagination control: extract exactly this one page
            let mut items = self.strategy.extract_listing(&first_doc, &label);
            drop(first_doc);
            if full_load {
                self.enrich_batch(&mut items).await;
            }
            let saved = self.persist(&items)?;
            tracing::info!("Parsed category by link: {}", category.link);
            return Ok(saved);
        };
        drop(first_doc);

        let mut saved_total = 0;
        for window in page_windows(pages, self.batches.pages_per_window) {
            let urls: Vec<String> = window
                .map(|page| self.strategy.page_url(&category.link, page))
                .collect();

            // concurrent fetches, joined by source position so the flattened
            // batch keeps window order regardless of completion order
            let per_page = join_all(urls.iter().map(|url| self.extract_page(url, &label))).await;
            let mut items: Vec<Item> = per_page.into_iter().flatten().collect();

            if full_load {
                self.enrich_batch(&mut items).await;
            }

            tracing::info!("Parsed {} pages, {} items", urls.len(), items.len());
            saved_total += self.persist(&items)?;
        }

        tracing::info!("Parsed category by link: {}", category.link);
        Ok(saved_total)
    }

    /// Fetches one listing page and extracts its items
    async fn extract_page(&self, url: &str, label: &str) -> Vec<Item> {
        let doc = self.fetcher.fetch_document(url).await;
        let items = self.strategy.extract_listing(&doc, label);
        tracing::debug!("Page {}: {} items", url, items.len());
        items
    }

    /// Enriches a batch in concurrent sub-windows of bounded size
    ///
    /// Enrichment is per-item isolated: the strategy's `enrich` swallows its
    /// own fetch failures, so one bad item leaves its siblings untouched.
    async fn enrich_batch(&self, items: &mut [Item]) {
        for chunk in items.chunks_mut(self.batches.items_per_window) {
            join_all(
                chunk
                    .iter_mut()
                    .map(|item| self.strategy.enrich(&self.fetcher, item)),
            )
            .await;
        }
    }

    /// Persists one window's batch; empty batches are skipped
    fn persist(&self, items: &[Item]) -> Result<u64, CrawlError> {
        if items.is_empty() {
            return Ok(0);
        }
        self.sink.save_all(items)?;
        Ok(items.len() as u64)
    }
}
