//! The draft configuration: the in-session "systems record" being built.
//!
//! A draft is a single-owner, in-memory value. It is created once per
//! editing session (blank, or a deep copy of a persisted record), mutated
//! only through [`crate::controller::BuilderController`], and handed whole
//! to the persistence port on finalize. Budget figures are derived: they
//! are recomputed in full from the selected items after every mutation,
//! never adjusted incrementally, so they cannot drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogItem, ItemProperties};
use crate::ids::DraftId;
use crate::steps::{SelectionMode, SlotKey};

/// An immutable snapshot of a catalog item captured at selection time.
///
/// Snapshotting means later catalog changes never retroactively alter a
/// selection already in the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedItem {
    pub id: String,
    pub name: String,
    pub cost: i64,
    #[serde(default, skip_serializing_if = "properties_empty")]
    pub properties: ItemProperties,
}

fn properties_empty(props: &ItemProperties) -> bool {
    *props == ItemProperties::default()
}

impl SelectedItem {
    pub fn snapshot(item: &CatalogItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            cost: item.cost,
            properties: item.properties.clone(),
        }
    }
}

/// Derived credit accounting over all currently selected items.
///
/// `total` is fixed at draft creation. `remaining` may legitimately go
/// negative while editing; over-budget is detectable, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub total: i64,
    pub spent: i64,
    pub remaining: i64,
}

impl Budget {
    pub fn new(total: i64) -> Self {
        Self {
            total,
            spent: 0,
            remaining: total,
        }
    }

    pub fn is_over(&self) -> bool {
        self.remaining < 0
    }
}

/// Borrowed view of one slot's current selection, shaped by its mode.
#[derive(Debug, Clone, Copy)]
pub enum SlotSelection<'a> {
    Single(Option<&'a SelectedItem>),
    Multiple(&'a [SelectedItem]),
}

impl SlotSelection<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(item) => item.is_none(),
            Self::Multiple(items) => items.is_empty(),
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Self::Single(item) => usize::from(item.is_some()),
            Self::Multiple(items) => items.len(),
        }
    }

    pub fn contains(&self, item_id: &str) -> bool {
        match self {
            Self::Single(item) => item.is_some_and(|i| i.id == item_id),
            Self::Multiple(items) => items.iter().any(|i| i.id == item_id),
        }
    }
}

/// The work-in-progress rig build.
///
/// Single-select slots hold `None` when empty; multi-select slots keep
/// insertion order and never contain two items with the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftConfig {
    pub id: DraftId,
    pub created_at: DateTime<Utc>,
    pub budget: Budget,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locomotion: Option<SelectedItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor: Option<SelectedItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armor: Option<SelectedItem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub appendages: Vec<SelectedItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessories: Vec<SelectedItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weapons: Vec<SelectedItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sensors: Vec<SelectedItem>,
}

impl DraftConfig {
    /// A blank draft with the given credit total.
    pub fn new(total: i64) -> Self {
        Self {
            id: DraftId::new(),
            created_at: Utc::now(),
            budget: Budget::new(total),
            locomotion: None,
            processor: None,
            armor: None,
            appendages: Vec::new(),
            accessories: Vec::new(),
            weapons: Vec::new(),
            sensors: Vec::new(),
        }
    }

    /// Current selection for a slot, shaped by the slot's mode.
    pub fn selection(&self, key: SlotKey) -> SlotSelection<'_> {
        match key {
            SlotKey::Locomotion => SlotSelection::Single(self.locomotion.as_ref()),
            SlotKey::Processor => SlotSelection::Single(self.processor.as_ref()),
            SlotKey::Armor => SlotSelection::Single(self.armor.as_ref()),
            SlotKey::Appendages => SlotSelection::Multiple(&self.appendages),
            SlotKey::Accessories => SlotSelection::Multiple(&self.accessories),
            SlotKey::Weapons => SlotSelection::Multiple(&self.weapons),
            SlotKey::Sensors => SlotSelection::Multiple(&self.sensors),
        }
    }

    pub(crate) fn single_slot_mut(&mut self, key: SlotKey) -> Option<&mut Option<SelectedItem>> {
        match key {
            SlotKey::Locomotion => Some(&mut self.locomotion),
            SlotKey::Processor => Some(&mut self.processor),
            SlotKey::Armor => Some(&mut self.armor),
            _ => None,
        }
    }

    pub(crate) fn multi_slot_mut(&mut self, key: SlotKey) -> Option<&mut Vec<SelectedItem>> {
        match key {
            SlotKey::Appendages => Some(&mut self.appendages),
            SlotKey::Accessories => Some(&mut self.accessories),
            SlotKey::Weapons => Some(&mut self.weapons),
            SlotKey::Sensors => Some(&mut self.sensors),
            _ => None,
        }
    }

    /// Every selected item across every slot, single slots first, then
    /// multi slots in canonical order.
    pub fn selected_items(&self) -> impl Iterator<Item = &SelectedItem> {
        self.locomotion
            .iter()
            .chain(self.processor.iter())
            .chain(self.armor.iter())
            .chain(self.appendages.iter())
            .chain(self.accessories.iter())
            .chain(self.weapons.iter())
            .chain(self.sensors.iter())
    }

    /// Reset one slot to its empty state.
    pub(crate) fn clear_slot(&mut self, key: SlotKey) {
        match key.mode() {
            SelectionMode::Single => {
                if let Some(slot) = self.single_slot_mut(key) {
                    *slot = None;
                }
            }
            SelectionMode::Multiple => {
                if let Some(slot) = self.multi_slot_mut(key) {
                    slot.clear();
                }
            }
        }
    }

    /// Full recomputation of `spent`/`remaining` from current selections.
    pub(crate) fn recompute_budget(&mut self) {
        let spent: i64 = self.selected_items().map(|item| item.cost).sum();
        self.budget.spent = spent;
        self.budget.remaining = self.budget.total - spent;
    }
}
