//! SQLite-backed item store

use crate::items::{Item, Source};
use crate::storage::{ItemSink, PageMeta, Paginated, StorageError, StorageResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// SQLite storage backend for product records
///
/// The connection sits behind a mutex so the store can be shared with the
/// read side; the crawl engine itself persists from a single task.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and initializes the schema
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // journal_mode returns a row, so set pragmas through pragma_update
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;

        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory store (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Total number of persisted items
    pub fn count(&self) -> StorageResult<u64> {
        let conn = self.conn.lock().unwrap();
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(total as u64)
    }

    /// Returns one page of items with paging metadata
    ///
    /// `page` starts at 1; `count` must be in `1..=100`. Requesting a page
    /// past the last one is an error, and with zero stored items
    /// `total_pages` is zero, so every page request is then invalid.
    pub fn find_all_paginate(&self, page: u32, count: u32) -> StorageResult<Paginated> {
        if page < 1 {
            return Err(StorageError::InvalidQuery(
                "page must be >= 1".to_string(),
            ));
        }
        if !(1..=100).contains(&count) {
            return Err(StorageError::InvalidQuery(format!(
                "count must be between 1 and 100, got {}",
                count
            )));
        }

        let conn = self.conn.lock().unwrap();
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        let total_pages = (total as u32).div_ceil(count);

        if page > total_pages {
            return Err(StorageError::PageOutOfRange { page, total_pages });
        }

        let offset = (page - 1) * count;
        let mut stmt = conn.prepare(
            "SELECT id, title, subtitle, link, description, price, specifications, type, image, source
             FROM items ORDER BY id LIMIT ?1 OFFSET ?2",
        )?;

        let raw_rows = stmt
            .query_map(params![count, offset], |row| {
                Ok(RawRow {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    subtitle: row.get(2)?,
                    link: row.get(3)?,
                    description: row.get(4)?,
                    price: row.get(5)?,
                    specifications: row.get(6)?,
                    kind: row.get(7)?,
                    image: row.get(8)?,
                    source: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut content = Vec::with_capacity(raw_rows.len());
        for raw in raw_rows {
            content.push(raw.into_item()?);
        }

        Ok(Paginated {
            content,
            meta: PageMeta {
                count_per_page: count,
                current_page: page,
                total_pages,
            },
        })
    }
}

impl ItemSink for SqliteStore {
    /// Inserts the whole batch inside one transaction
    fn save_all(&self, items: &[Item]) -> StorageResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO items (title, subtitle, link, description, price, specifications, type, image, source)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for item in items {
                stmt.execute(params![
                    item.title,
                    item.subtitle,
                    item.link,
                    item.description,
                    item.price,
                    item.specifications_json()?,
                    item.kind,
                    item.image,
                    item.source.as_str(),
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!("Saved new items batch with {} items", items.len());
        Ok(())
    }
}

/// A row as stored, before conversion back into an [`Item`]
struct RawRow {
    id: i64,
    title: String,
    subtitle: Option<String>,
    link: String,
    description: Option<String>,
    price: f64,
    specifications: Option<String>,
    kind: String,
    image: String,
    source: String,
}

impl RawRow {
    fn into_item(self) -> StorageResult<Item> {
        let source = Source::from_db_string(&self.source).ok_or_else(|| {
            StorageError::Corrupt(format!("unknown source '{}' in row {}", self.source, self.id))
        })?;

        let specifications = self
            .specifications
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Item {
            id: Some(self.id),
            title: self.title,
            subtitle: self.subtitle,
            link: self.link,
            description: self.description,
            price: self.price,
            specifications,
            kind: self.kind,
            image: self.image,
            source,
        })
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            subtitle TEXT,
            link TEXT NOT NULL,
            description TEXT,
            price REAL NOT NULL,
            specifications TEXT,
            type TEXT NOT NULL,
            image TEXT NOT NULL,
            source TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_items_source ON items(source);
    ",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::Specifications;

    fn sample_item(title: &str, price: f64) -> Item {
        Item {
            id: None,
            title: title.to_string(),
            subtitle: None,
            link: format!("https://example.com/{}/", title),
            description: None,
            price,
            specifications: None,
            kind: "widgets".to_string(),
            image: "https://example.com/img.jpg".to_string(),
            source: Source::Telemart,
        }
    }

    fn store_with(n: usize) -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        let items: Vec<Item> = (0..n).map(|i| sample_item(&format!("item-{}", i), i as f64)).collect();
        store.save_all(&items).unwrap();
        store
    }

    #[test]
    fn save_all_assigns_sequential_ids() {
        let store = store_with(3);
        assert_eq!(store.count().unwrap(), 3);

        let page = store.find_all_paginate(1, 10).unwrap();
        let ids: Vec<i64> = page.content.iter().filter_map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn save_all_is_append_only_across_batches() {
        let store = store_with(2);
        store.save_all(&[sample_item("again", 5.0)]).unwrap();
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn paginate_computes_total_pages_with_ceil() {
        let store = store_with(42);

        let page = store.find_all_paginate(5, 10).unwrap();
        assert_eq!(page.meta.total_pages, 5);
        assert_eq!(page.meta.current_page, 5);
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.content[0].title, "item-40");
    }

    #[test]
    fn paginate_rejects_page_past_the_end() {
        let store = store_with(42);
        let err = store.find_all_paginate(6, 10).unwrap_err();
        assert!(matches!(
            err,
            StorageError::PageOutOfRange {
                page: 6,
                total_pages: 5
            }
        ));
    }

    #[test]
    fn paginate_on_empty_store_has_zero_pages() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.find_all_paginate(1, 10).unwrap_err();
        assert!(matches!(
            err,
            StorageError::PageOutOfRange {
                page: 1,
                total_pages: 0
            }
        ));
    }

    #[test]
    fn paginate_rejects_out_of_bounds_count() {
        let store = store_with(1);
        assert!(matches!(
            store.find_all_paginate(1, 0),
            Err(StorageError::InvalidQuery(_))
        ));
        assert!(matches!(
            store.find_all_paginate(1, 101),
            Err(StorageError::InvalidQuery(_))
        ));
    }

    #[test]
    fn specifications_survive_the_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();

        let mut specs = Specifications::new();
        specs.push_text("Socket", "AM5");
        specs.push_group(
            "Memory",
            vec![("Slots".to_string(), "4".to_string())],
        );

        let mut item = sample_item("cpu", 7999.0);
        item.specifications = Some(specs.clone());
        item.description = Some("Fast.".to_string());
        store.save_all(&[item]).unwrap();

        let page = store.find_all_paginate(1, 10).unwrap();
        assert_eq!(page.content[0].specifications, Some(specs));
        assert_eq!(page.content[0].description.as_deref(), Some("Fast."));
    }

    #[test]
    fn duplicate_batches_are_not_deduplicated() {
        // no dedup key exists: crawling the same catalog twice doubles rows
        let store = SqliteStore::open_in_memory().unwrap();
        let batch = vec![sample_item("same", 1.0), sample_item("same", 1.0)];
        store.save_all(&batch).unwrap();
        store.save_all(&batch).unwrap();
        assert_eq!(store.count().unwrap(), 4);
    }
}
