//! RigBld domain layer.
//!
//! Pure, synchronous state for the multi-step rig builder: the draft
//! configuration being assembled, the credit budget derived from it, the
//! host-supplied catalog of purchasable options, and the controller that
//! mediates every read and write during an editing session.
//!
//! Nothing in this crate performs IO. Persistence, rendering, and session
//! management live in `rigbldr-engine` behind ports.

pub mod catalog;
pub mod controller;
pub mod draft;
pub mod error;
pub mod ids;
pub mod steps;
pub mod validation;

pub use catalog::{Catalog, CatalogItem, ItemProperties};
pub use controller::{AdvanceOutcome, BuilderController};
pub use draft::{Budget, DraftConfig, SelectedItem, SlotSelection};
pub use error::BuilderError;
pub use ids::DraftId;
pub use steps::{SelectionMode, SlotKey, StepConfig, StepRegistry};
pub use validation::{StepValidation, ValidationRule};
