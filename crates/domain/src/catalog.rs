//! The host-supplied catalog of purchasable options.
//!
//! The catalog is read-only from the builder's perspective: the controller
//! looks items up and snapshots them, but never mutates the lists.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::steps::SlotKey;

/// Optional gameplay properties carried by catalog items.
///
/// A fixed typed struct rather than a free-form key/value map, so a
/// misspelled property name is a compile error instead of a silently
/// dropped field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_bonus: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dex_bonus: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defense_bonus: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_bonus: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One purchasable option for a step. `id` is unique within its step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    /// Credit cost; providers supply values >= 0.
    pub cost: i64,
    #[serde(default, skip_serializing_if = "item_properties_empty")]
    pub properties: ItemProperties,
}

fn item_properties_empty(props: &ItemProperties) -> bool {
    *props == ItemProperties::default()
}

impl CatalogItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, cost: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost,
            properties: ItemProperties::default(),
        }
    }

    pub fn with_properties(mut self, properties: ItemProperties) -> Self {
        self.properties = properties;
        self
    }
}

/// Read-only mapping from step to its ordered list of options.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<SlotKey, Vec<CatalogItem>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(mut self, key: SlotKey, items: Vec<CatalogItem>) -> Self {
        self.entries.insert(key, items);
        self
    }

    /// All options for a step; empty for a step with no catalog entry.
    pub fn items(&self, key: SlotKey) -> &[CatalogItem] {
        self.entries.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find(&self, key: SlotKey, item_id: &str) -> Option<&CatalogItem> {
        self.items(key).iter().find(|item| item.id == item_id)
    }
}
