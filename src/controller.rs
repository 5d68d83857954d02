//! Step controller.
//!
//! Owns the wizard's navigation state and the composite record. Forward
//! navigation is gated on section validation; entering the summary step is
//! gated on full-record validation; actual submission is further gated
//! behind an explicit confirmation.
//!
//! The controller is the only writer of the composite record, and every
//! navigation operation honors the busy flag while a network call is in
//! flight.

use crate::adapter::AdapterRegistry;
use crate::error::{RecformError, Result};
use crate::payload::{SubmitMode, build_payload};
use crate::section::CompositeRecord;
use crate::step::WizardStep;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Whether the wizard creates a new record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    /// Editing the record with this persisted identifier.
    Edit { id: i64 },
}

impl WizardMode {
    /// The persisted record id, when one is already bound.
    pub const fn record_id(self) -> Option<i64> {
        match self {
            Self::Create => None,
            Self::Edit { id } => Some(id),
        }
    }

    pub const fn is_edit(self) -> bool {
        matches!(self, Self::Edit { .. })
    }
}

/// Navigation and record state for one open wizard.
#[derive(Debug)]
pub struct StepController {
    mode: WizardMode,
    current: WizardStep,
    /// Grow-only. Decides which steps' live adapter state is re-read by
    /// [`StepController::collect_all`] versus which steps' stored data is
    /// authoritative.
    visited: BTreeSet<WizardStep>,
    record: CompositeRecord,
    /// Edit-mode steps whose adapter has already been hydrated.
    hydrated: BTreeSet<WizardStep>,
    busy: bool,
    confirm_open: bool,
    last_error: Option<String>,
}

impl StepController {
    /// Open a wizard in create mode with an empty record.
    pub fn new_create() -> Self {
        Self::with_record(WizardMode::Create, CompositeRecord::new())
    }

    /// Open a wizard in edit mode around an already-hydrated record.
    pub fn new_edit(id: i64, record: CompositeRecord) -> Self {
        Self::with_record(WizardMode::Edit { id }, record)
    }

    fn with_record(mode: WizardMode, record: CompositeRecord) -> Self {
        Self {
            mode,
            current: WizardStep::default(),
            visited: BTreeSet::from([WizardStep::default()]),
            record,
            hydrated: BTreeSet::new(),
            busy: false,
            confirm_open: false,
            last_error: None,
        }
    }

    pub fn mode(&self) -> WizardMode {
        self.mode
    }

    pub fn current_step(&self) -> WizardStep {
        self.current
    }

    pub fn visited_steps(&self) -> &BTreeSet<WizardStep> {
        &self.visited
    }

    pub fn record(&self) -> &CompositeRecord {
        &self.record
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Set by the submission orchestrator around its suspension points.
    pub(crate) fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn confirm_open(&self) -> bool {
        self.confirm_open
    }

    /// Last surfaced step or payload error, for inline display.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn ensure_not_busy(&self) -> Result<()> {
        if self.busy {
            Err(RecformError::navigation(
                "a request is in flight; navigation is disabled",
            ))
        } else {
            Ok(())
        }
    }

    /// Mark a step entered: record the visit and, in edit mode, hydrate its
    /// adapter from the stored section on first entry (lazy hydration).
    fn enter(&mut self, step: WizardStep, registry: &mut AdapterRegistry) {
        self.current = step;
        self.visited.insert(step);
        debug!(step = %step, "entered step");

        if self.mode.is_edit()
            && !step.is_summary()
            && !self.hydrated.contains(&step)
            && let Some(key) = step.data_key()
            && let Some(data) = self.record.get(key).cloned()
            && let Ok(adapter) = registry.get_mut(step)
        {
            adapter.hydrate(&data);
            self.hydrated.insert(step);
        }
    }

    /// Validate the current step and persist its data into the record.
    ///
    /// On success the extracted data is merged only when non-empty, so an
    /// unchanged section never erases stored values.
    fn persist_current(&mut self, registry: &mut AdapterRegistry) -> Result<()> {
        let Some(key) = self.current.data_key() else {
            return Ok(());
        };
        let outcome = registry.get_mut(self.current)?.validate_and_extract();
        if !outcome.is_valid {
            let message = outcome
                .error
                .unwrap_or_else(|| format!("{} did not validate", self.current));
            self.last_error = Some(message.clone());
            return Err(RecformError::validation(message));
        }
        if let Some(data) = outcome.data {
            self.record.merge(key, data);
        }
        Ok(())
    }

    /// Best-effort persistence for retreating navigation: validation
    /// failures are swallowed, the user is leaving, not submitting.
    fn persist_current_best_effort(&mut self, registry: &mut AdapterRegistry) {
        let Some(key) = self.current.data_key() else {
            return;
        };
        match registry.get_mut(self.current) {
            Ok(adapter) => {
                let outcome = adapter.validate_and_extract();
                if outcome.is_valid {
                    if let Some(data) = outcome.data {
                        self.record.merge(key, data);
                    }
                } else {
                    warn!(step = %self.current, "discarding invalid in-progress data");
                }
            }
            Err(err) => warn!(step = %self.current, %err, "no adapter for best-effort persist"),
        }
    }

    /// Advance to the next step.
    ///
    /// The current step's adapter must validate; leaving the last data step
    /// additionally requires the full record to pass the required-field
    /// gate. On failure the current step and the record are left unchanged
    /// for the failing section and the error is surfaced.
    pub fn next(&mut self, registry: &mut AdapterRegistry) -> Result<WizardStep> {
        self.ensure_not_busy()?;
        let Some(target) = self.current.next() else {
            return Err(RecformError::navigation("already at the summary step"));
        };

        self.persist_current(registry)?;

        if self.current.is_last_data_step() {
            // Entering the summary requires the whole record to be valid
            if let Err(err) = build_payload(&self.record, SubmitMode::Full) {
                self.last_error = Some(err.to_string());
                return Err(err.into());
            }
        }

        self.last_error = None;
        self.enter(target, registry);
        Ok(target)
    }

    /// Retreat one step, persisting in-progress data best-effort.
    pub fn back(&mut self, registry: &mut AdapterRegistry) -> Result<WizardStep> {
        self.ensure_not_busy()?;
        let Some(target) = self.current.previous() else {
            return Err(RecformError::navigation("already at the first step"));
        };
        self.persist_current_best_effort(registry);
        self.confirm_open = false;
        self.enter(target, registry);
        Ok(target)
    }

    /// Jump directly to any step, bypassing forward validation.
    ///
    /// Edit mode only: every section of an existing record is already
    /// populated, so revisiting in any order is safe.
    pub fn jump_to(&mut self, step: WizardStep, registry: &mut AdapterRegistry) -> Result<WizardStep> {
        self.ensure_not_busy()?;
        if !self.mode.is_edit() {
            return Err(RecformError::navigation(
                "jumping between steps is only available in edit mode",
            ));
        }
        if step == self.current {
            return Ok(step);
        }
        self.persist_current_best_effort(registry);
        self.confirm_open = false;
        self.enter(step, registry);
        Ok(step)
    }

    /// Open the submission confirmation gate. Only valid on the summary.
    pub fn open_confirm(&mut self) -> Result<()> {
        if !self.current.is_summary() {
            return Err(RecformError::navigation(
                "submission can only be confirmed from the summary step",
            ));
        }
        self.confirm_open = true;
        Ok(())
    }

    pub fn cancel_confirm(&mut self) {
        self.confirm_open = false;
    }

    /// Gather authoritative data for every step.
    ///
    /// Steps that were visited (or are current) have their live adapter
    /// state re-read; for all other steps the stored section data is
    /// authoritative. Invalid live state is skipped with a warning — the
    /// payload builder is the gate that decides whether the result is
    /// submittable.
    pub fn collect_all(&mut self, registry: &mut AdapterRegistry) {
        for step in WizardStep::data_steps() {
            if !self.visited.contains(step) && *step != self.current {
                continue;
            }
            let Some(key) = step.data_key() else { continue };
            let Ok(adapter) = registry.get_mut(*step) else {
                continue;
            };
            let outcome = adapter.validate_and_extract();
            if outcome.is_valid {
                if let Some(data) = outcome.data {
                    self.record.merge(key, data);
                }
            } else {
                warn!(step = %step, "live section state invalid; keeping stored data");
            }
        }
    }

    /// Tear down all wizard state. Called on close, success or cancel.
    pub(crate) fn teardown(&mut self) {
        self.record.clear();
        self.visited.clear();
        self.hydrated.clear();
        self.current = WizardStep::default();
        self.confirm_open = false;
        self.busy = false;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{SectionAdapter, SectionOutcome};
    use crate::section::{SectionData, SectionKey};
    use serde_json::{Value, json};

    /// Scriptable adapter for controller tests.
    struct StubAdapter {
        valid: bool,
        data: Option<SectionData>,
        hydrated_with: Option<SectionData>,
        extract_calls: usize,
    }

    impl StubAdapter {
        fn valid_with(data: Value) -> Self {
            Self {
                valid: true,
                data: Some(SectionData::Single(data)),
                hydrated_with: None,
                extract_calls: 0,
            }
        }

        fn invalid() -> Self {
            Self {
                valid: false,
                data: None,
                hydrated_with: None,
                extract_calls: 0,
            }
        }
    }

    impl SectionAdapter for StubAdapter {
        fn validate_and_extract(&mut self) -> SectionOutcome {
            self.extract_calls += 1;
            if self.valid {
                match &self.data {
                    Some(data) => SectionOutcome::valid(data.clone()),
                    None => SectionOutcome::unchanged(),
                }
            } else {
                SectionOutcome::invalid("section rejected")
            }
        }

        fn hydrate(&mut self, data: &SectionData) {
            self.hydrated_with = Some(data.clone());
        }
    }

    fn registry_with(step: WizardStep, adapter: StubAdapter) -> AdapterRegistry {
        let mut registry = AdapterRegistry::new();
        registry.register(step, Box::new(adapter)).unwrap();
        registry
    }

    #[test]
    fn test_next_merges_and_advances() {
        let mut registry =
            registry_with(WizardStep::General, StubAdapter::valid_with(json!({"code": "E-1"})));
        let mut ctrl = StepController::new_create();

        let step = ctrl.next(&mut registry).unwrap();
        assert_eq!(step, WizardStep::Address);
        assert_eq!(ctrl.current_step(), WizardStep::Address);
        assert!(ctrl.visited_steps().contains(&WizardStep::Address));
        assert_eq!(
            ctrl.record().get(SectionKey::General).unwrap().as_object(),
            Some(&json!({"code": "E-1"}))
        );
    }

    #[test]
    fn test_next_on_invalid_step_stays_put() {
        let mut registry = registry_with(WizardStep::General, StubAdapter::invalid());
        let mut ctrl = StepController::new_create();

        let err = ctrl.next(&mut registry).unwrap_err();
        assert!(matches!(err, RecformError::Validation(_)));
        assert_eq!(ctrl.current_step(), WizardStep::General);
        assert!(ctrl.record().is_empty());
        assert_eq!(ctrl.last_error(), Some("section rejected"));
    }

    #[test]
    fn test_next_with_unchanged_data_keeps_stored() {
        let mut registry = AdapterRegistry::new();
        registry
            .register(
                WizardStep::General,
                Box::new(StubAdapter {
                    valid: true,
                    data: None,
                    hydrated_with: None,
                    extract_calls: 0,
                }),
            )
            .unwrap();

        let mut ctrl = StepController::new_create();
        ctrl.record
            .merge(SectionKey::General, SectionData::Single(json!({"code": "kept"})));

        ctrl.next(&mut registry).unwrap();
        assert_eq!(
            ctrl.record().get(SectionKey::General).unwrap().as_object(),
            Some(&json!({"code": "kept"}))
        );
    }

    #[test]
    fn test_back_swallows_invalid_data() {
        let mut registry = registry_with(WizardStep::Address, StubAdapter::invalid());
        let mut ctrl = StepController::new_create();
        ctrl.current = WizardStep::Address;
        ctrl.visited.insert(WizardStep::Address);

        // Invalid in-progress data is discarded, not an error
        let step = ctrl.back(&mut registry).unwrap();
        assert_eq!(step, WizardStep::General);
        assert!(ctrl.record().is_empty());
    }

    #[test]
    fn test_back_at_first_step_fails() {
        let mut registry = AdapterRegistry::new();
        let mut ctrl = StepController::new_create();
        assert!(ctrl.back(&mut registry).is_err());
    }

    #[test]
    fn test_jump_requires_edit_mode() {
        let mut registry = AdapterRegistry::new();
        let mut ctrl = StepController::new_create();
        let err = ctrl.jump_to(WizardStep::Account, &mut registry).unwrap_err();
        assert!(matches!(err, RecformError::Navigation(_)));

        let mut ctrl = StepController::new_edit(7, CompositeRecord::new());
        let step = ctrl.jump_to(WizardStep::Account, &mut registry).unwrap();
        assert_eq!(step, WizardStep::Account);
    }

    #[test]
    fn test_busy_blocks_navigation() {
        let mut registry =
            registry_with(WizardStep::General, StubAdapter::valid_with(json!({"a": 1})));
        let mut ctrl = StepController::new_create();
        ctrl.set_busy(true);

        assert!(ctrl.next(&mut registry).is_err());
        assert!(ctrl.back(&mut registry).is_err());
        assert_eq!(ctrl.current_step(), WizardStep::General);

        ctrl.set_busy(false);
        assert!(ctrl.next(&mut registry).is_ok());
    }

    #[test]
    fn test_confirm_gate_only_on_summary() {
        let mut ctrl = StepController::new_create();
        assert!(ctrl.open_confirm().is_err());
        assert!(!ctrl.confirm_open());

        ctrl.current = WizardStep::Summary;
        ctrl.open_confirm().unwrap();
        assert!(ctrl.confirm_open());
        ctrl.cancel_confirm();
        assert!(!ctrl.confirm_open());
    }

    #[test]
    fn test_edit_mode_hydrates_lazily_once() {
        let mut record = CompositeRecord::new();
        record.merge(SectionKey::Address, SectionData::Single(json!({"region_id": 1})));
        record.merge(SectionKey::General, SectionData::Single(json!({"code": "E-1"})));

        let mut registry = AdapterRegistry::new();
        registry
            .register(WizardStep::Address, Box::new(StubAdapter::valid_with(json!({}))))
            .unwrap();

        let mut ctrl = StepController::new_edit(7, record);
        ctrl.jump_to(WizardStep::Address, &mut registry).unwrap();

        // Downcast-free check: re-register would lose state, so peek via jump-away-and-back
        ctrl.jump_to(WizardStep::Account, &mut registry).unwrap();
        ctrl.jump_to(WizardStep::Address, &mut registry).unwrap();
        assert!(ctrl.hydrated.contains(&WizardStep::Address));
    }

    #[test]
    fn test_visited_only_grows() {
        let mut registry =
            registry_with(WizardStep::General, StubAdapter::valid_with(json!({"a": 1})));
        let mut ctrl = StepController::new_create();
        ctrl.next(&mut registry).unwrap();
        assert!(ctrl.visited_steps().contains(&WizardStep::General));
        assert!(ctrl.visited_steps().contains(&WizardStep::Address));

        // Going back does not shrink the visited set
        ctrl.back(&mut registry).ok();
        assert!(ctrl.visited_steps().contains(&WizardStep::Address));
    }

    #[test]
    fn test_collect_all_reads_only_visited_or_current() {
        let mut registry = AdapterRegistry::new();
        registry
            .register(
                WizardStep::General,
                Box::new(StubAdapter::valid_with(json!({"code": "live"}))),
            )
            .unwrap();
        registry
            .register(
                WizardStep::Account,
                Box::new(StubAdapter::valid_with(json!({"bank_id": 99}))),
            )
            .unwrap();

        let mut ctrl = StepController::new_create();
        // Account was never visited: its live state must not be read
        ctrl.collect_all(&mut registry);
        assert_eq!(
            ctrl.record().get(SectionKey::General).unwrap().as_object(),
            Some(&json!({"code": "live"}))
        );
        assert!(ctrl.record().get(SectionKey::Account).is_none());
    }

    #[test]
    fn test_teardown_clears_everything() {
        let mut registry =
            registry_with(WizardStep::General, StubAdapter::valid_with(json!({"a": 1})));
        let mut ctrl = StepController::new_create();
        ctrl.next(&mut registry).unwrap();
        ctrl.teardown();

        assert!(ctrl.record().is_empty());
        assert!(ctrl.visited_steps().is_empty());
        assert_eq!(ctrl.current_step(), WizardStep::General);
        assert!(!ctrl.is_busy());
    }
}
