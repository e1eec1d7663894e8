//! Caller-supplied step validation.
//!
//! The controller supplies no rule semantics of its own; it is plumbing
//! that connects the current slot value to a host-defined predicate and
//! reports the outcome. Errors block advancing, warnings never do.

use crate::draft::{DraftConfig, SlotSelection};
use crate::steps::StepConfig;

/// Outcome of running one step's validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl StepValidation {
    /// A passing outcome with no messages.
    pub fn ok() -> Self {
        Self::from_parts(Vec::new(), Vec::new())
    }

    /// `valid` depends only on `errors`; warnings are soft.
    pub fn from_parts(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// A failing outcome carrying a single error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self::from_parts(vec![error.into()], Vec::new())
    }
}

/// A pure predicate over one step's selection, supplied by the host.
pub trait ValidationRule: Send + Sync {
    fn validate(
        &self,
        selection: SlotSelection<'_>,
        draft: &DraftConfig,
        config: &StepConfig,
    ) -> StepValidation;
}

impl<F> ValidationRule for F
where
    F: Fn(SlotSelection<'_>, &DraftConfig, &StepConfig) -> StepValidation + Send + Sync,
{
    fn validate(
        &self,
        selection: SlotSelection<'_>,
        draft: &DraftConfig,
        config: &StepConfig,
    ) -> StepValidation {
        self(selection, draft, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::SlotKey;

    #[test]
    fn validity_tracks_errors_only() {
        let outcome = StepValidation::from_parts(Vec::new(), vec!["pricey".into()]);
        assert!(outcome.valid);

        let outcome = StepValidation::from_parts(vec!["empty".into()], Vec::new());
        assert!(!outcome.valid);
    }

    #[test]
    fn closures_are_rules() {
        let rule = |selection: SlotSelection<'_>, _: &DraftConfig, _: &StepConfig| {
            if selection.is_empty() {
                StepValidation::failure("select a locomotion system")
            } else {
                StepValidation::ok()
            }
        };

        let draft = DraftConfig::new(100);
        let outcome = rule.validate(
            draft.selection(SlotKey::Locomotion),
            &draft,
            &StepConfig::for_key(SlotKey::Locomotion),
        );
        assert_eq!(outcome.errors, vec!["select a locomotion system"]);
    }
}
