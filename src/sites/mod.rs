//! Site extraction strategies
//!
//! Each supported catalog site implements [`SiteStrategy`]: one shared
//! capability set consumed by the crawl engine. Strategies differ only in
//! selector paths, price normalization policy, specification shape, and
//! link validation; the traversal itself lives in [`crate::crawler`].

mod price;
mod rozetka;
mod telemart;

pub use rozetka::RozetkaSite;
pub use telemart::TelemartSite;

use crate::fetch::PageFetcher;
use crate::items::{Category, Item, Source};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Site-specific extraction logic behind the shared crawl engine
///
/// `count_pages` returning `None` is the explicit single-page case: the
/// category has no pagination control, one page of listings is extracted,
/// and that is not an error.
#[allow(async_fn_in_trait)]
pub trait SiteStrategy {
    /// Which source this strategy crawls
    fn source(&self) -> Source;

    /// Site root; discovery starts from its document
    fn base_url(&self) -> &str;

    /// Walks the site navigation and returns every crawlable category
    ///
    /// Sub-discovery requests (resolving subcategory pages) run concurrently
    /// with no bound: the top-level category count is small and fixed by the
    /// site, not user-controlled, so this is the one intentionally unbounded
    /// fan-out in the system.
    async fn discover_categories(&self, fetcher: &PageFetcher) -> Vec<Category>;

    /// Number of listing pages in a category, or `None` when the category
    /// has no pagination control
    fn count_pages(&self, category_doc: &Html) -> Option<u32>;

    /// Listing URL for the given page number of a category
    fn page_url(&self, category_link: &str, page: u32) -> String;

    /// Maps one listing document into product records
    fn extract_listing(&self, page_doc: &Html, category_label: &str) -> Vec<Item>;

    /// Fetches description/image/specification pages for one item and fills
    /// in the enrichment fields
    ///
    /// A failed enrichment leaves the item's fields absent; it never fails
    /// the item or its siblings. An already-set specification map is never
    /// overwritten.
    async fn enrich(&self, fetcher: &PageFetcher, item: &mut Item);

    /// Category label stored on each item, derived from the category link
    fn category_label(&self, category_link: &str) -> String {
        path_label(category_link)
    }
}

/// Parses a hard-coded CSS selector
///
/// Only called with string literals; every one of them is exercised by unit
/// tests, so a parse failure cannot reach production.
pub(crate) fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("hard-coded selector is valid")
}

/// Collected, whitespace-trimmed text of an element
pub(crate) fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first match under `parent`, if non-empty
pub(crate) fn first_text(parent: ElementRef, selector: &Selector) -> Option<String> {
    parent
        .select(selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

/// Attribute of the first match under `parent`
pub(crate) fn first_attr(parent: ElementRef, selector: &Selector, name: &str) -> Option<String> {
    parent
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(name))
        .map(str::to_string)
}

/// Whether an element carries the given class
pub(crate) fn has_class(element: ElementRef, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Resolves an href against a base URL, keeping only http(s) results
pub(crate) fn absolute_link(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let base = Url::parse(base).ok()?;
    let resolved = base.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    Some(resolved.to_string())
}

/// Last meaningful path segment of a category link, used as the item's
/// category label
pub(crate) fn path_label(link: &str) -> String {
    Url::parse(link)
        .ok()
        .and_then(|url| {
            url.path_segments().and_then(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .last()
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| link.trim_end_matches('/').to_string())
}
