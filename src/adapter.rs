//! Section adapter contract.
//!
//! Each section renderer (a UI concern outside this crate) plugs into the
//! wizard through [`SectionAdapter`]. The controller is polymorphic over the
//! trait: it validates and extracts section data without knowing the
//! section's shape, and pushes hydrated values back in edit mode.

use crate::error::{RecformError, Result};
use crate::section::SectionData;
use crate::step::WizardStep;
use std::collections::BTreeMap;

/// Result of asking a section to validate itself and hand over its data.
#[derive(Debug, Clone, Default)]
pub struct SectionOutcome {
    /// Whether the section's own validation passed.
    pub is_valid: bool,
    /// The extracted data. May be `None` (or empty) even on success when
    /// the section has no changes to report.
    pub data: Option<SectionData>,
    /// Inline error message for the section when invalid.
    pub error: Option<String>,
}

impl SectionOutcome {
    /// A valid outcome carrying data.
    pub fn valid(data: SectionData) -> Self {
        Self {
            is_valid: true,
            data: Some(data),
            error: None,
        }
    }

    /// A valid outcome with nothing new to report.
    pub fn unchanged() -> Self {
        Self {
            is_valid: true,
            data: None,
            error: None,
        }
    }

    /// A failed outcome with an inline message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Capability contract every section variant must satisfy.
///
/// Implementors own their local editing state; the wizard core only ever
/// talks to them through these three operations.
pub trait SectionAdapter {
    /// Validate the section's current editing state and extract its data.
    fn validate_and_extract(&mut self) -> SectionOutcome;

    /// Push externally loaded values into the section's local editing state.
    fn hydrate(&mut self, data: &SectionData);

    /// Clear local editing state. Default is a no-op.
    fn reset(&mut self) {}
}

impl std::fmt::Debug for dyn SectionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SectionAdapter")
    }
}

/// Registry of section adapters keyed by wizard step.
///
/// Dispatch is by the step enum, never by positional index, so a reordered
/// flow can't silently bind a step to the wrong section.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<WizardStep, Box<dyn SectionAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter for a data step.
    ///
    /// Registering for the summary step is rejected: it has no data.
    pub fn register(
        &mut self,
        step: WizardStep,
        adapter: Box<dyn SectionAdapter>,
    ) -> Result<()> {
        if step.is_summary() {
            return Err(RecformError::state(
                "cannot register an adapter for the summary step",
            ));
        }
        self.adapters.insert(step, adapter);
        Ok(())
    }

    /// Look up the adapter for a step.
    pub fn get_mut(&mut self, step: WizardStep) -> Result<&mut Box<dyn SectionAdapter>> {
        self.adapters
            .get_mut(&step)
            .ok_or_else(|| RecformError::state(format!("no adapter registered for step {step}")))
    }

    pub fn contains(&self, step: WizardStep) -> bool {
        self.adapters.contains_key(&step)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Reset every registered adapter. Called on wizard teardown.
    pub fn reset_all(&mut self) {
        for adapter in self.adapters.values_mut() {
            adapter.reset();
        }
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("steps", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}
