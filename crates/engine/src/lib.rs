//! RigBld engine layer.
//!
//! Hosts the builder session use cases and the infrastructure boundary:
//! the persistence port the host application implements, plus in-process
//! adapters good enough for tests and single-process hosts. All async in
//! this crate exists only to await port side effects; the domain's own
//! state transitions stay synchronous.

pub mod infrastructure;
pub mod use_cases;

pub use infrastructure::memory::{InMemoryDraftRepo, SystemClock};
pub use infrastructure::ports::{ClockPort, DraftRepo, PersistedDraft, RepoError};
pub use use_cases::builder_session::{
    AdvanceResult, BuilderSessionUseCases, FinalizeResult, SessionError, StartSessionResult,
};
