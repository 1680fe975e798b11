//! Domain records produced by the crawl
//!
//! A [`Category`] is transient: discovered at the start of a crawl, consumed
//! by pagination, never persisted. An [`Item`] is the persisted product
//! record; its `id` is assigned by the storage sink on insert.

mod spec_map;

pub use spec_map::{SpecValue, Specifications};

use std::fmt;
use std::str::FromStr;

/// Which catalog site a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Rozetka,
    Telemart,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rozetka => "rozetka",
            Self::Telemart => "telemart",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "rozetka" => Some(Self::Rozetka),
            "telemart" => Some(Self::Telemart),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_string(&s.to_ascii_lowercase())
            .ok_or_else(|| format!("unknown source '{}', expected rozetka or telemart", s))
    }
}

/// A catalog category discovered during a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Human-readable category name, as shown in the site navigation
    pub title: String,
    /// Absolute link to the category's first listing page
    pub link: String,
}

/// A persisted product record
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Assigned by the storage sink; `None` until inserted
    pub id: Option<i64>,
    pub title: String,
    pub subtitle: Option<String>,
    /// Absolute link to the product page
    pub link: String,
    pub description: Option<String>,
    /// Finite and non-negative; an unparseable price is handled per strategy
    /// before an `Item` is ever built
    pub price: f64,
    /// Absent until enrichment runs; set at most once
    pub specifications: Option<Specifications>,
    /// Category label, stored in the `type` column
    pub kind: String,
    pub image: String,
    pub source: Source,
}

impl Item {
    /// Serializes the specification map to the JSON text stored in the
    /// `specifications` column
    pub fn specifications_json(&self) -> Result<Option<String>, serde_json::Error> {
        self.specifications
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
    }
}
