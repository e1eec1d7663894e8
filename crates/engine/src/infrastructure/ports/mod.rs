//! Port traits for infrastructure boundaries.
//!
//! These are the only abstractions in the engine. Ports exist for:
//! - Draft persistence (the host document store behind `DraftRepo`)
//! - Clock (for testable finalize timestamps)

mod error;
mod repos;
mod testing;

pub use error::RepoError;
pub use repos::{DraftRepo, PersistedDraft};
pub use testing::ClockPort;

#[cfg(test)]
pub use repos::MockDraftRepo;

#[cfg(test)]
pub use testing::MockClockPort;
