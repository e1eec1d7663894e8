//! In-process adapters: a concurrent-map draft store and the system clock.
//!
//! Sufficient for tests and single-process hosts; a host with a real
//! document store supplies its own `DraftRepo` implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use rigbldr_domain::DraftId;

use super::ports::{ClockPort, DraftRepo, PersistedDraft, RepoError};

/// `DraftRepo` backed by a `DashMap`. Each save replaces the whole record
/// under the draft's ID, matching the port's atomic-write contract.
#[derive(Debug, Default)]
pub struct InMemoryDraftRepo {
    drafts: DashMap<DraftId, PersistedDraft>,
}

impl InMemoryDraftRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftRepo for InMemoryDraftRepo {
    async fn get(&self, id: DraftId) -> Result<Option<PersistedDraft>, RepoError> {
        Ok(self.drafts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, draft: &PersistedDraft) -> Result<(), RepoError> {
        self.drafts.insert(draft.draft.id, draft.clone());
        Ok(())
    }

    async fn delete(&self, id: DraftId) -> Result<(), RepoError> {
        self.drafts.remove(&id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<PersistedDraft>, RepoError> {
        Ok(self.drafts.iter().map(|entry| entry.value().clone()).collect())
    }
}

/// Wall-clock `ClockPort`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
