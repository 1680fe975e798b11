//! Storage for extracted product records
//!
//! The crawl engine depends on [`ItemSink`] only: append a whole batch of
//! items, atomically. The read side ([`SqliteStore::find_all_paginate`])
//! serves the paginated listing over everything persisted so far.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::items::Item;
use thiserror::Error;

/// Storage-layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to serialize specifications: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Page doesn't exist: page {page} of {total_pages}")]
    PageOutOfRange { page: u32, total_pages: u32 },
}

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Batch append sink consumed by the crawl engine
///
/// `save_all` persists the whole batch or fails as a whole; the engine does
/// no partial-batch reconciliation.
pub trait ItemSink {
    fn save_all(&self, items: &[Item]) -> StorageResult<()>;
}

impl<K: ItemSink + ?Sized> ItemSink for &K {
    fn save_all(&self, items: &[Item]) -> StorageResult<()> {
        (**self).save_all(items)
    }
}

/// One page of persisted items plus paging metadata
#[derive(Debug)]
pub struct Paginated {
    pub content: Vec<Item>,
    pub meta: PageMeta,
}

/// Paging metadata returned alongside a listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub count_per_page: u32,
    pub current_page: u32,
    pub total_pages: u32,
}
