//! The builder state controller.
//!
//! Single source of truth during an editing session for what is selected,
//! what it costs, and whether it is legal to move forward. Every mutating
//! operation is all-or-nothing: on any error the draft, the budget, and
//! the edited-step history are exactly as they were before the call.

use std::collections::HashSet;

use crate::catalog::{Catalog, CatalogItem};
use crate::draft::{Budget, DraftConfig, SelectedItem, SlotSelection};
use crate::error::BuilderError;
use crate::steps::{SelectionMode, SlotKey, StepConfig, StepRegistry};
use crate::validation::{StepValidation, ValidationRule};

/// Result of a successful forward navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// Steps strictly downstream of the advanced-from step, returned as
    /// pruning CANDIDATES when that step was edited this session. Whether
    /// each candidate is still valid, and whether to clear it, is the
    /// caller's decision; the controller lacks the rule knowledge to judge.
    pub pruned_steps: Vec<SlotKey>,
    pub budget: Budget,
}

/// Mediates all reads and writes to one draft configuration.
///
/// Owns the draft, a read-only catalog, the ordered step registry, and the
/// history of which steps were edited during this session. The history
/// exists solely to decide whether back-navigation invalidation candidates
/// should be reported on the next advance.
pub struct BuilderController {
    draft: DraftConfig,
    catalog: Catalog,
    registry: StepRegistry,
    edited: HashSet<SlotKey>,
}

impl BuilderController {
    /// Start a session on a blank draft with the given credit total.
    pub fn new(catalog: Catalog, registry: StepRegistry, total: i64) -> Self {
        Self::resume(DraftConfig::new(total), catalog, registry)
    }

    /// Resume a session from a previously persisted draft.
    ///
    /// The draft is taken by value (the caller deep-copied it out of
    /// storage); the edited-step history starts empty, so merely browsing
    /// a resumed draft reports no pruning candidates.
    pub fn resume(mut draft: DraftConfig, catalog: Catalog, registry: StepRegistry) -> Self {
        // Persisted figures are untrusted; derive them fresh.
        draft.recompute_budget();
        Self {
            draft,
            catalog,
            registry,
            edited: HashSet::new(),
        }
    }

    fn step_config(&self, step: SlotKey) -> Result<StepConfig, BuilderError> {
        self.registry.config(step).ok_or_else(|| {
            BuilderError::missing_configuration(format!("step '{step}' is not part of this flow"))
        })
    }

    /// Overwrite a single-select slot with a snapshot of the catalog item.
    ///
    /// Replaces any prior selection wholesale; there is no merging. Marks
    /// the step edited and recomputes the budget.
    pub fn select_single(&mut self, step: SlotKey, item_id: &str) -> Result<Budget, BuilderError> {
        let config = self.step_config(step)?;
        if config.mode != SelectionMode::Single {
            return Err(BuilderError::WrongSelectionMode {
                step,
                actual: config.mode,
            });
        }

        let snapshot = self
            .catalog
            .find(step, item_id)
            .map(SelectedItem::snapshot)
            .ok_or_else(|| BuilderError::invalid_selection(step, item_id))?;

        if let Some(slot) = self.draft.single_slot_mut(step) {
            *slot = Some(snapshot);
        }
        self.mark_edited_and_recompute(step);
        Ok(self.draft.budget)
    }

    /// Add (`add = true`) or remove (`add = false`) an item in a
    /// multi-select slot.
    ///
    /// Adding an id already present fails with `DuplicateSelection`;
    /// removing an id not present is an idempotent no-op success. List
    /// order of untouched entries is preserved in both directions.
    pub fn toggle_multi(
        &mut self,
        step: SlotKey,
        item_id: &str,
        add: bool,
    ) -> Result<Budget, BuilderError> {
        let config = self.step_config(step)?;
        if config.mode != SelectionMode::Multiple {
            return Err(BuilderError::WrongSelectionMode {
                step,
                actual: config.mode,
            });
        }

        if add {
            if self.draft.selection(step).contains(item_id) {
                return Err(BuilderError::duplicate_selection(step, item_id));
            }
            let snapshot = self
                .catalog
                .find(step, item_id)
                .map(SelectedItem::snapshot)
                .ok_or_else(|| BuilderError::invalid_selection(step, item_id))?;
            if let Some(slot) = self.draft.multi_slot_mut(step) {
                slot.push(snapshot);
            }
        } else if let Some(slot) = self.draft.multi_slot_mut(step) {
            slot.retain(|item| item.id != item_id);
        }

        self.mark_edited_and_recompute(step);
        Ok(self.draft.budget)
    }

    /// Run the caller-supplied rule against the step's current selection.
    ///
    /// Never fails outright: a missing rule or a step outside the flow is
    /// reported inside the returned outcome as a validation error.
    pub fn validate_step(
        &self,
        step: SlotKey,
        rule: Option<&dyn ValidationRule>,
    ) -> StepValidation {
        let Some(config) = self.registry.config(step) else {
            return StepValidation::failure(format!("no configuration for step '{step}'"));
        };
        let Some(rule) = rule else {
            return StepValidation::failure(format!("no validation rule supplied for '{step}'"));
        };
        rule.validate(self.draft.selection(step), &self.draft, &config)
    }

    /// Convenience wrapper: is forward navigation allowed by the rule?
    pub fn can_advance(&self, step: SlotKey, rule: Option<&dyn ValidationRule>) -> bool {
        self.validate_step(step, rule).valid
    }

    /// Guard a forward step transition.
    ///
    /// Fails with `ValidationFailed` when the rule reports errors, and
    /// with `BudgetExceeded` when `remaining < 0`; neither failure touches
    /// the draft or the history. On success, reports downstream pruning
    /// candidates when the current step was edited this session (including
    /// on a revisit after going back).
    pub fn advance(
        &mut self,
        current: SlotKey,
        rule: Option<&dyn ValidationRule>,
    ) -> Result<AdvanceOutcome, BuilderError> {
        self.step_config(current)?;

        let outcome = self.validate_step(current, rule);
        if !outcome.valid {
            return Err(BuilderError::ValidationFailed {
                step: current,
                errors: outcome.errors,
            });
        }

        self.draft.recompute_budget();
        let budget = self.draft.budget;
        if budget.is_over() {
            return Err(BuilderError::BudgetExceeded {
                overage: -budget.remaining,
            });
        }

        let pruned_steps = if self.edited.contains(&current) {
            self.registry.downstream_of(current)
        } else {
            Vec::new()
        };

        Ok(AdvanceOutcome {
            pruned_steps,
            budget,
        })
    }

    /// Acknowledge back-navigation. Deliberately a no-op: browsing earlier
    /// steps has no side effects, and invalidation candidates are only
    /// computed on the next `advance`.
    pub fn go_back(&self, _from: SlotKey, _to: SlotKey) {}

    /// Reset a step's slot to empty and forget that it was edited.
    ///
    /// Idempotent: pruning an already-empty step changes nothing.
    pub fn prune(&mut self, step: SlotKey) -> Result<Budget, BuilderError> {
        self.step_config(step)?;
        self.draft.clear_slot(step);
        self.edited.remove(&step);
        self.draft.recompute_budget();
        Ok(self.draft.budget)
    }

    fn mark_edited_and_recompute(&mut self, step: SlotKey) {
        self.edited.insert(step);
        self.draft.recompute_budget();
    }

    // =========================================================================
    // Queries (side-effect-free)
    // =========================================================================

    pub fn budget(&self) -> Budget {
        self.draft.budget
    }

    pub fn selected(&self, step: SlotKey) -> SlotSelection<'_> {
        self.draft.selection(step)
    }

    /// Catalog options for a step; empty for a step with no catalog entry.
    pub fn available(&self, step: SlotKey) -> &[CatalogItem] {
        self.catalog.items(step)
    }

    /// Would this item fit in the remaining budget as-is?
    pub fn can_add_item(&self, item: &CatalogItem) -> bool {
        item.cost <= self.draft.budget.remaining
    }

    pub fn was_edited(&self, step: SlotKey) -> bool {
        self.edited.contains(&step)
    }

    pub fn draft(&self) -> &DraftConfig {
        &self.draft
    }

    /// Hand the whole draft to the finalize collaborator.
    pub fn into_draft(self) -> DraftConfig {
        self.draft
    }
}
