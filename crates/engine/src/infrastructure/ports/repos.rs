//! The persistence port for draft configurations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rigbldr_domain::{DraftConfig, DraftId};

use super::error::RepoError;

/// A draft as the host document store holds it: the whole systems record
/// plus the timestamp of the atomic write that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDraft {
    pub draft: DraftConfig,
    pub saved_at: DateTime<Utc>,
}

/// Persistence port for draft configurations.
///
/// `save` is the finalize collaborator's single atomic whole-draft write;
/// partial writes are the adapter's bug, not a representable state here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DraftRepo: Send + Sync {
    /// Load a persisted draft by ID.
    async fn get(&self, id: DraftId) -> Result<Option<PersistedDraft>, RepoError>;

    /// Write the whole draft in one operation, replacing any prior record.
    async fn save(&self, draft: &PersistedDraft) -> Result<(), RepoError>;

    /// Delete a persisted draft.
    async fn delete(&self, id: DraftId) -> Result<(), RepoError>;

    /// List all persisted drafts.
    async fn list(&self) -> Result<Vec<PersistedDraft>, RepoError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigbldr_domain::{BuilderController, Catalog, CatalogItem, SlotKey, StepRegistry};

    #[test]
    fn persisted_layout_mirrors_the_draft_shape() {
        let catalog = Catalog::new().with_items(
            SlotKey::Locomotion,
            vec![CatalogItem::new("wheeled", "Wheeled", 300)],
        );
        let mut controller = BuilderController::new(catalog, StepRegistry::rig(), 2000);
        controller.select_single(SlotKey::Locomotion, "wheeled").unwrap();

        let persisted = PersistedDraft {
            draft: controller.into_draft(),
            saved_at: Utc::now(),
        };

        let json = serde_json::to_value(&persisted).unwrap();
        assert_eq!(json["draft"]["budget"]["spent"], 300);
        assert_eq!(json["draft"]["locomotion"]["id"], "wheeled");
        assert!(json["savedAt"].is_string());

        let back: PersistedDraft = serde_json::from_value(json).unwrap();
        assert_eq!(back, persisted);
    }
}
