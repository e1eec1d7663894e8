//! Builder session use cases.
//!
//! One session per draft: created blank or resumed from the persistence
//! port, edited in memory through the domain controller, and written back
//! in a single atomic save on finalize. Cancelling a session discards the
//! in-memory draft and never touches storage, because nothing is written
//! before finalize.

mod error;

pub use error::SessionError;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use rigbldr_domain::{
    AdvanceOutcome, Budget, BuilderController, Catalog, CatalogItem, DraftId, SelectedItem,
    SlotKey, SlotSelection, StepRegistry, StepValidation, ValidationRule,
};

use crate::infrastructure::ports::{ClockPort, DraftRepo, PersistedDraft};

// =============================================================================
// Result Types
// =============================================================================

/// Result of starting or resuming a builder session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSessionResult {
    pub draft_id: DraftId,
    pub budget: Budget,
}

/// Result of a successful forward navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceResult {
    /// Downstream pruning candidates; clearing them (or not) is the host's
    /// policy call, typically a `prune_step` per candidate it deems stale.
    pub pruned_steps: Vec<SlotKey>,
    pub budget: Budget,
}

/// Result of finalizing a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeResult {
    pub draft_id: DraftId,
    pub saved_at: DateTime<Utc>,
}

// =============================================================================
// Use Cases
// =============================================================================

/// One live editing session: the controller plus the host-supplied
/// per-step validation rules.
struct BuilderSession {
    controller: BuilderController,
    rules: HashMap<SlotKey, Arc<dyn ValidationRule>>,
}

impl BuilderSession {
    fn rule(&self, step: SlotKey) -> Option<&dyn ValidationRule> {
        self.rules.get(&step).map(|rule| rule.as_ref())
    }
}

/// Container for builder session use cases.
///
/// Independent sessions live side by side in a concurrent map; a single
/// session is operated serially by its owning user, so the domain needs
/// no locking of its own.
pub struct BuilderSessionUseCases {
    draft_repo: Arc<dyn DraftRepo>,
    clock: Arc<dyn ClockPort>,
    sessions: DashMap<DraftId, BuilderSession>,
}

impl BuilderSessionUseCases {
    pub fn new(draft_repo: Arc<dyn DraftRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            draft_repo,
            clock,
            sessions: DashMap::new(),
        }
    }

    /// Start a session on a blank draft. Nothing is persisted until
    /// `finalize_session`.
    pub fn start_session(
        &self,
        catalog: Catalog,
        registry: StepRegistry,
        rules: HashMap<SlotKey, Arc<dyn ValidationRule>>,
        total: i64,
    ) -> StartSessionResult {
        let controller = BuilderController::new(catalog, registry, total);
        let draft_id = controller.draft().id;
        let budget = controller.budget();
        self.sessions
            .insert(draft_id, BuilderSession { controller, rules });

        tracing::info!(
            draft_id = %draft_id,
            total = budget.total,
            "Started builder session"
        );

        StartSessionResult { draft_id, budget }
    }

    /// Resume a session from a persisted draft.
    ///
    /// The persisted record is deep-copied into a fresh controller with an
    /// empty edited-step history.
    pub async fn resume_session(
        &self,
        draft_id: DraftId,
        catalog: Catalog,
        registry: StepRegistry,
        rules: HashMap<SlotKey, Arc<dyn ValidationRule>>,
    ) -> Result<StartSessionResult, SessionError> {
        let persisted = self
            .draft_repo
            .get(draft_id)
            .await?
            .ok_or(SessionError::DraftNotFound(draft_id))?;

        let controller = BuilderController::resume(persisted.draft, catalog, registry);
        let budget = controller.budget();
        self.sessions
            .insert(draft_id, BuilderSession { controller, rules });

        tracing::info!(
            draft_id = %draft_id,
            spent = budget.spent,
            "Resumed builder session"
        );

        Ok(StartSessionResult { draft_id, budget })
    }

    fn with_session<T>(
        &self,
        draft_id: DraftId,
        op: impl FnOnce(&mut BuilderSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut entry = self
            .sessions
            .get_mut(&draft_id)
            .ok_or(SessionError::SessionNotFound(draft_id))?;
        op(&mut entry)
    }

    /// Overwrite a single-select slot with the named catalog item.
    pub fn select_single(
        &self,
        draft_id: DraftId,
        step: SlotKey,
        item_id: &str,
    ) -> Result<Budget, SessionError> {
        let budget = self.with_session(draft_id, |session| {
            Ok(session.controller.select_single(step, item_id)?)
        })?;

        tracing::debug!(
            draft_id = %draft_id,
            step = %step,
            item_id = %item_id,
            spent = budget.spent,
            "Selected item"
        );
        Ok(budget)
    }

    /// Add or remove an item in a multi-select slot.
    pub fn toggle_multi(
        &self,
        draft_id: DraftId,
        step: SlotKey,
        item_id: &str,
        add: bool,
    ) -> Result<Budget, SessionError> {
        let budget = self.with_session(draft_id, |session| {
            Ok(session.controller.toggle_multi(step, item_id, add)?)
        })?;

        tracing::debug!(
            draft_id = %draft_id,
            step = %step,
            item_id = %item_id,
            add,
            spent = budget.spent,
            "Toggled item"
        );
        Ok(budget)
    }

    /// Run the step's registered rule against its current selection.
    pub fn validate_step(
        &self,
        draft_id: DraftId,
        step: SlotKey,
    ) -> Result<StepValidation, SessionError> {
        self.with_session(draft_id, |session| {
            Ok(session.controller.validate_step(step, session.rule(step)))
        })
    }

    /// Guard a forward transition; on success report pruning candidates.
    pub fn advance_step(
        &self,
        draft_id: DraftId,
        step: SlotKey,
    ) -> Result<AdvanceResult, SessionError> {
        let outcome = self.with_session(draft_id, |session| {
            let BuilderSession { controller, rules } = session;
            let rule = rules.get(&step).map(|rule| rule.as_ref());
            Ok(controller.advance(step, rule)?)
        })?;

        let AdvanceOutcome {
            pruned_steps,
            budget,
        } = outcome;
        tracing::debug!(
            draft_id = %draft_id,
            step = %step,
            candidates = pruned_steps.len(),
            "Advanced step"
        );
        Ok(AdvanceResult {
            pruned_steps,
            budget,
        })
    }

    /// Acknowledge back-navigation. No state change; invalidation
    /// candidates surface on the next advance.
    pub fn go_back(
        &self,
        draft_id: DraftId,
        from: SlotKey,
        to: SlotKey,
    ) -> Result<(), SessionError> {
        self.with_session(draft_id, |session| {
            session.controller.go_back(from, to);
            Ok(())
        })?;
        tracing::debug!(draft_id = %draft_id, from = %from, to = %to, "Went back");
        Ok(())
    }

    /// Reset one step's slot and its edited mark.
    pub fn prune_step(&self, draft_id: DraftId, step: SlotKey) -> Result<Budget, SessionError> {
        let budget =
            self.with_session(draft_id, |session| Ok(session.controller.prune(step)?))?;
        tracing::debug!(draft_id = %draft_id, step = %step, spent = budget.spent, "Pruned step");
        Ok(budget)
    }

    /// Current derived budget.
    pub fn budget(&self, draft_id: DraftId) -> Result<Budget, SessionError> {
        self.with_session(draft_id, |session| Ok(session.controller.budget()))
    }

    /// Cloned view of a step's current selection.
    pub fn selected_items(
        &self,
        draft_id: DraftId,
        step: SlotKey,
    ) -> Result<Vec<SelectedItem>, SessionError> {
        self.with_session(draft_id, |session| {
            Ok(match session.controller.selected(step) {
                SlotSelection::Single(item) => item.into_iter().cloned().collect(),
                SlotSelection::Multiple(items) => items.to_vec(),
            })
        })
    }

    /// Catalog options for a step; empty for an unstocked step.
    pub fn available_items(
        &self,
        draft_id: DraftId,
        step: SlotKey,
    ) -> Result<Vec<CatalogItem>, SessionError> {
        self.with_session(draft_id, |session| {
            Ok(session.controller.available(step).to_vec())
        })
    }

    /// Commit the whole draft through the persistence port, then drop the
    /// session. On a failed save the session survives so the user can
    /// retry or keep editing.
    pub async fn finalize_session(&self, draft_id: DraftId) -> Result<FinalizeResult, SessionError> {
        let draft = self.with_session(draft_id, |session| {
            Ok(session.controller.draft().clone())
        })?;

        let persisted = PersistedDraft {
            draft,
            saved_at: self.clock.now(),
        };
        self.draft_repo.save(&persisted).await?;
        self.sessions.remove(&draft_id);

        tracing::info!(
            draft_id = %draft_id,
            spent = persisted.draft.budget.spent,
            "Finalized builder session"
        );
        Ok(FinalizeResult {
            draft_id,
            saved_at: persisted.saved_at,
        })
    }

    /// Discard a session's in-memory state. Storage is never touched:
    /// nothing was written before finalize, so there is nothing to undo.
    pub fn cancel_session(&self, draft_id: DraftId) -> Result<(), SessionError> {
        self.sessions
            .remove(&draft_id)
            .ok_or(SessionError::SessionNotFound(draft_id))?;
        tracing::info!(draft_id = %draft_id, "Cancelled builder session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryDraftRepo;
    use crate::infrastructure::ports::{MockClockPort, MockDraftRepo, RepoError};
    use chrono::TimeZone;
    use rigbldr_domain::{DraftConfig, StepConfig};

    fn rig_catalog() -> Catalog {
        Catalog::new()
            .with_items(
                SlotKey::Locomotion,
                vec![
                    CatalogItem::new("wheeled", "Wheeled", 300),
                    CatalogItem::new("hover", "Hover", 900),
                ],
            )
            .with_items(
                SlotKey::Sensors,
                vec![
                    CatalogItem::new("sensor-a", "Sensor Pack A", 150),
                    CatalogItem::new("sensor-b", "Sensor Pack B", 250),
                ],
            )
    }

    fn pass_rules() -> HashMap<SlotKey, Arc<dyn ValidationRule>> {
        let rule = |_: SlotSelection<'_>, _: &DraftConfig, _: &StepConfig| StepValidation::ok();
        SlotKey::ALL
            .into_iter()
            .map(|key| (key, Arc::new(rule) as Arc<dyn ValidationRule>))
            .collect()
    }

    fn pinned_clock() -> MockClockPort {
        let mut clock = MockClockPort::new();
        let now = Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0).unwrap();
        clock.expect_now().returning(move || now);
        clock
    }

    #[tokio::test]
    async fn full_session_edits_then_finalizes_one_atomic_save() {
        let repo = Arc::new(InMemoryDraftRepo::new());
        let use_cases = BuilderSessionUseCases::new(repo.clone(), Arc::new(pinned_clock()));

        let started = use_cases.start_session(rig_catalog(), StepRegistry::rig(), pass_rules(), 2000);
        let id = started.draft_id;
        assert_eq!(started.budget.remaining, 2000);

        // Nothing persisted while editing.
        use_cases.select_single(id, SlotKey::Locomotion, "wheeled").unwrap();
        use_cases.toggle_multi(id, SlotKey::Sensors, "sensor-a", true).unwrap();
        assert!(repo.get(id).await.unwrap().is_none());

        let advanced = use_cases.advance_step(id, SlotKey::Locomotion).unwrap();
        assert_eq!(advanced.budget.spent, 450);

        let finalized = use_cases.finalize_session(id).await.unwrap();
        assert_eq!(finalized.draft_id, id);

        let persisted = repo.get(id).await.unwrap().unwrap();
        assert_eq!(persisted.saved_at, finalized.saved_at);
        assert_eq!(persisted.draft.budget.spent, 450);
        assert_eq!(
            persisted.draft.locomotion.as_ref().map(|i| i.id.as_str()),
            Some("wheeled")
        );

        // The session is gone after finalize.
        assert!(matches!(
            use_cases.budget(id),
            Err(SessionError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn failed_save_keeps_the_session_alive_for_retry() {
        let mut repo = MockDraftRepo::new();
        let mut saves = 0;
        repo.expect_save().returning(move |_| {
            saves += 1;
            if saves == 1 {
                Err(RepoError::storage("save_draft", "document store offline"))
            } else {
                Ok(())
            }
        });
        let use_cases = BuilderSessionUseCases::new(Arc::new(repo), Arc::new(pinned_clock()));

        let started = use_cases.start_session(rig_catalog(), StepRegistry::rig(), pass_rules(), 2000);
        let id = started.draft_id;

        let err = use_cases.finalize_session(id).await.unwrap_err();
        assert!(matches!(err, SessionError::Repo(_)));

        // Still editable, and a retry succeeds.
        assert!(use_cases.budget(id).is_ok());
        assert!(use_cases.finalize_session(id).await.is_ok());
    }

    #[tokio::test]
    async fn cancel_discards_without_touching_storage() {
        // No expectations on the mock: any repo call would panic the test.
        let repo = MockDraftRepo::new();
        let use_cases = BuilderSessionUseCases::new(Arc::new(repo), Arc::new(pinned_clock()));

        let started = use_cases.start_session(rig_catalog(), StepRegistry::rig(), pass_rules(), 2000);
        let id = started.draft_id;
        use_cases.select_single(id, SlotKey::Locomotion, "hover").unwrap();

        use_cases.cancel_session(id).unwrap();
        assert!(matches!(
            use_cases.budget(id),
            Err(SessionError::SessionNotFound(_))
        ));
        assert!(matches!(
            use_cases.cancel_session(id),
            Err(SessionError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn resume_loads_the_persisted_draft_and_rederives_budget() {
        let repo = Arc::new(InMemoryDraftRepo::new());
        let use_cases = BuilderSessionUseCases::new(repo.clone(), Arc::new(pinned_clock()));

        let started = use_cases.start_session(rig_catalog(), StepRegistry::rig(), pass_rules(), 2000);
        let id = started.draft_id;
        use_cases.toggle_multi(id, SlotKey::Sensors, "sensor-b", true).unwrap();
        use_cases.finalize_session(id).await.unwrap();

        let resumed = use_cases
            .resume_session(id, rig_catalog(), StepRegistry::rig(), pass_rules())
            .await
            .unwrap();
        assert_eq!(resumed.budget.spent, 250);
        assert_eq!(
            use_cases
                .selected_items(id, SlotKey::Sensors)
                .unwrap()
                .iter()
                .map(|i| i.id.as_str())
                .collect::<Vec<_>>(),
            ["sensor-b"]
        );
    }

    #[tokio::test]
    async fn resume_of_unknown_draft_is_draft_not_found() {
        let mut repo = MockDraftRepo::new();
        repo.expect_get().returning(|_| Ok(None));
        let use_cases = BuilderSessionUseCases::new(Arc::new(repo), Arc::new(pinned_clock()));

        let err = use_cases
            .resume_session(DraftId::new(), rig_catalog(), StepRegistry::rig(), pass_rules())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::DraftNotFound(_)));
    }

    #[tokio::test]
    async fn operations_on_unknown_sessions_fail_cleanly() {
        let use_cases = BuilderSessionUseCases::new(
            Arc::new(InMemoryDraftRepo::new()),
            Arc::new(pinned_clock()),
        );
        let id = DraftId::new();

        assert!(matches!(
            use_cases.select_single(id, SlotKey::Locomotion, "wheeled"),
            Err(SessionError::SessionNotFound(_))
        ));
        assert!(matches!(
            use_cases.advance_step(id, SlotKey::Locomotion),
            Err(SessionError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn domain_errors_pass_through_the_session_layer() {
        let use_cases = BuilderSessionUseCases::new(
            Arc::new(InMemoryDraftRepo::new()),
            Arc::new(pinned_clock()),
        );
        let started = use_cases.start_session(rig_catalog(), StepRegistry::rig(), pass_rules(), 200);
        let id = started.draft_id;

        let err = use_cases
            .select_single(id, SlotKey::Locomotion, "rockets")
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Builder(rigbldr_domain::BuilderError::InvalidSelection { .. })
        ));

        // Over budget: selection succeeds, advance is the gate.
        use_cases.select_single(id, SlotKey::Locomotion, "wheeled").unwrap();
        let err = use_cases.advance_step(id, SlotKey::Locomotion).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Builder(rigbldr_domain::BuilderError::BudgetExceeded { overage: 100 })
        ));
    }

    #[tokio::test]
    async fn host_prunes_candidates_after_re_editing_an_earlier_step() {
        let use_cases = BuilderSessionUseCases::new(
            Arc::new(InMemoryDraftRepo::new()),
            Arc::new(pinned_clock()),
        );
        let started = use_cases.start_session(rig_catalog(), StepRegistry::rig(), pass_rules(), 2000);
        let id = started.draft_id;

        use_cases.select_single(id, SlotKey::Locomotion, "wheeled").unwrap();
        use_cases.advance_step(id, SlotKey::Locomotion).unwrap();
        use_cases.toggle_multi(id, SlotKey::Sensors, "sensor-a", true).unwrap();

        // Go back, change the earlier step, advance again.
        use_cases.go_back(id, SlotKey::Sensors, SlotKey::Locomotion).unwrap();
        use_cases.select_single(id, SlotKey::Locomotion, "hover").unwrap();
        let advanced = use_cases.advance_step(id, SlotKey::Locomotion).unwrap();
        assert!(advanced.pruned_steps.contains(&SlotKey::Sensors));

        // Host policy here: clear every candidate that holds a selection.
        for step in advanced.pruned_steps {
            use_cases.prune_step(id, step).unwrap();
        }
        assert!(use_cases.selected_items(id, SlotKey::Sensors).unwrap().is_empty());
        assert_eq!(use_cases.budget(id).unwrap().spent, 900);
    }

    #[tokio::test]
    async fn validate_step_without_a_registered_rule_is_invalid() {
        let use_cases = BuilderSessionUseCases::new(
            Arc::new(InMemoryDraftRepo::new()),
            Arc::new(pinned_clock()),
        );
        let started = use_cases.start_session(
            rig_catalog(),
            StepRegistry::rig(),
            HashMap::new(),
            2000,
        );

        let outcome = use_cases
            .validate_step(started.draft_id, SlotKey::Locomotion)
            .unwrap();
        assert!(!outcome.valid);
        assert!(outcome.errors[0].contains("locomotion"));
    }
}
