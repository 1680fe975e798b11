//! Ordered specification maps
//!
//! Product specifications are an ordered string map: flat `key -> value` for
//! Rozetka, `group -> key -> value` for Telemart. Insertion order follows the
//! order of rows on the product page and must survive serialization, so the
//! map is a vector of pairs with hand-written serde impls rather than a
//! `BTreeMap` that would re-sort keys.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single specification value: plain text, or a named group of rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecValue {
    Text(String),
    Group(Vec<(String, String)>),
}

/// An ordered specification map
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Specifications {
    entries: Vec<(String, SpecValue)>,
}

impl Specifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a flat `key -> value` entry
    pub fn push_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), SpecValue::Text(value.into())));
    }

    /// Appends a named group of `key -> value` rows
    pub fn push_group(&mut self, key: impl Into<String>, rows: Vec<(String, String)>) {
        self.entries.push((key.into(), SpecValue::Group(rows)));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, SpecValue)> {
        self.entries.iter()
    }

    /// Looks up an entry by key
    pub fn get(&self, key: &str) -> Option<&SpecValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

impl Serialize for Specifications {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            match value {
                SpecValue::Text(text) => map.serialize_entry(key, text)?,
                SpecValue::Group(rows) => {
                    map.serialize_entry(key, &OrderedPairs(rows))?;
                }
            }
        }
        map.end()
    }
}

/// Serializes a slice of pairs as a JSON object, preserving order
struct OrderedPairs<'a>(&'a [(String, String)]);

impl Serialize for OrderedPairs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Specifications {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SpecificationsVisitor)
    }
}

struct SpecificationsVisitor;

impl<'de> Visitor<'de> for SpecificationsVisitor {
    type Value = Specifications;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of strings or nested string maps")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut specs = Specifications::new();
        while let Some((key, value)) = access.next_entry::<String, RawValue>()? {
            match value {
                RawValue::Text(text) => specs.push_text(key, text),
                RawValue::Group(rows) => specs.push_group(key, rows.0),
            }
        }
        Ok(specs)
    }
}

/// Either a plain string or a nested string map, as found in the JSON column
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Text(String),
    Group(PairsInOrder),
}

/// Deserializes a JSON object into pairs without re-sorting keys
struct PairsInOrder(Vec<(String, String)>);

impl<'de> Deserialize<'de> for PairsInOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = PairsInOrder;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::new();
                while let Some(pair) = access.next_entry::<String, String>()? {
                    pairs.push(pair);
                }
                Ok(PairsInOrder(pairs))
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}
