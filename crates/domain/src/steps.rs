//! Step identity, selection modes, and the ordered step sequence.
//!
//! Slots are a fixed schema keyed by [`SlotKey`] rather than addressed by
//! path strings, so a typo in a step name is a compile error and the
//! selection mode of each slot is structural rather than configured.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BuilderError;

/// One stage of the linear builder sequence. Each step owns exactly one
/// slot in the draft configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKey {
    Locomotion,
    Processor,
    Armor,
    Appendages,
    Accessories,
    Weapons,
    Sensors,
}

/// Whether a step's slot holds one selection or an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Single,
    Multiple,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Multiple => write!(f, "multiple"),
        }
    }
}

impl SlotKey {
    /// Every slot key, in the canonical rig-builder order.
    pub const ALL: [SlotKey; 7] = [
        SlotKey::Locomotion,
        SlotKey::Processor,
        SlotKey::Armor,
        SlotKey::Appendages,
        SlotKey::Accessories,
        SlotKey::Weapons,
        SlotKey::Sensors,
    ];

    /// The wire/step name used by catalogs and persisted records.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Locomotion => "locomotion",
            Self::Processor => "processor",
            Self::Armor => "armor",
            Self::Appendages => "appendages",
            Self::Accessories => "accessories",
            Self::Weapons => "weapons",
            Self::Sensors => "sensors",
        }
    }

    /// The selection mode is inherent to the slot's shape in the draft.
    pub fn mode(&self) -> SelectionMode {
        match self {
            Self::Locomotion | Self::Processor | Self::Armor => SelectionMode::Single,
            Self::Appendages | Self::Accessories | Self::Weapons | Self::Sensors => {
                SelectionMode::Multiple
            }
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SlotKey {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SlotKey::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| BuilderError::MissingConfiguration(format!("unknown step '{s}'")))
    }
}

/// Per-step configuration handed to validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepConfig {
    pub key: SlotKey,
    pub mode: SelectionMode,
}

impl StepConfig {
    pub fn for_key(key: SlotKey) -> Self {
        Self {
            key,
            mode: key.mode(),
        }
    }
}

/// The ordered step sequence for one builder flow.
///
/// Supplied by the host application; used only to answer "which steps are
/// strictly after X" when an earlier step has been re-edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRegistry {
    order: Vec<SlotKey>,
}

impl StepRegistry {
    pub fn new(order: Vec<SlotKey>) -> Self {
        Self { order }
    }

    /// The full seven-step rig builder sequence.
    pub fn rig() -> Self {
        Self::new(SlotKey::ALL.to_vec())
    }

    pub fn order(&self) -> &[SlotKey] {
        &self.order
    }

    pub fn contains(&self, key: SlotKey) -> bool {
        self.order.contains(&key)
    }

    /// Configuration for a step, or `None` when the step is not part of
    /// this flow at all (a host integration bug, not a user error).
    pub fn config(&self, key: SlotKey) -> Option<StepConfig> {
        self.contains(key).then(|| StepConfig::for_key(key))
    }

    /// Steps strictly after `key` in the configured order. Empty when the
    /// key is last or absent from the order.
    pub fn downstream_of(&self, key: SlotKey) -> Vec<SlotKey> {
        match self.order.iter().position(|k| *k == key) {
            Some(idx) => self.order[idx + 1..].to_vec(),
            None => Vec::new(),
        }
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::rig()
    }
}
