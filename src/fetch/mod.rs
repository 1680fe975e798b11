//! Resilient HTTP fetching
//!
//! All page content enters the system through [`PageFetcher`]. Failures are
//! retried up to a fixed ceiling and then degrade to [`Fetched::Empty`]
//! instead of propagating: a transient network failure becomes "zero items
//! found here", never a crawl-aborting error.

mod fetcher;

pub use fetcher::{build_http_client, Fetched, PageFetcher};
