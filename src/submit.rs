//! Submission orchestration.
//!
//! Sequences draft saves, full submissions and updates: gathers
//! authoritative data for every visited step, runs the payload builder, and
//! invokes exactly one of `create`/`update` on the persistence client
//! depending on whether an id is already bound to the in-progress record.
//!
//! The engine is single-threaded and event-driven. A submission is split
//! into two halves: [`SubmissionOrchestrator::prepare`] gathers and encodes
//! the payload and hands back a generation-stamped [`SubmitTicket`], the
//! host runs the persistence call however it likes, and
//! [`SubmissionOrchestrator::resolve`] applies the outcome. The wizard can
//! close between the two halves; a stale ticket is discarded instead of
//! written back into torn-down state. [`SubmissionOrchestrator::submit`] is
//! the convenience that runs both halves around a blocking client.

use crate::adapter::{AdapterRegistry, SectionAdapter};
use crate::controller::StepController;
use crate::error::{RecformError, Result};
use crate::extract::extract_employee_record;
use crate::payload::{SubmitMode, TransportPayload, build_payload};
use crate::step::WizardStep;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Submission lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Persisting,
    Success,
    Failed,
}

/// Typed classification a server may attach to a failure.
///
/// When present it short-circuits the substring heuristics in
/// [`classify_persist_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistErrorKind {
    /// Transport-level failure; retrying may help.
    Network,
    /// The server rejected specific field values.
    Validation,
    /// Internal server fault.
    Internal,
}

/// Failure reported by the persistence layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PersistError {
    pub message: String,
    pub kind: Option<PersistErrorKind>,
}

impl PersistError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: None,
        }
    }

    pub fn with_kind(message: impl Into<String>, kind: PersistErrorKind) -> Self {
        Self {
            message: message.into(),
            kind: Some(kind),
        }
    }
}

/// Where a persistence failure should surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSurface {
    /// Raw backend noise: replace with a generic inline form error.
    Inline,
    /// User-actionable: show the message directly.
    UserFacing,
}

/// Message fragments that mark a failure as backend noise rather than
/// something a user can act on.
const NOISE_MARKERS: &[&str] = &[
    "sqlstate",
    "exception",
    "stack trace",
    "integrity constraint",
    "internal server error",
    "validation.",
    "undefined ",
];

/// Decide whether a persistence failure is shown raw or suppressed.
///
/// A typed kind from the server wins; the substring sniffing below it is a
/// fallback for servers that only send prose.
pub fn classify_persist_error(err: &PersistError) -> ErrorSurface {
    if let Some(kind) = err.kind {
        return match kind {
            PersistErrorKind::Internal => ErrorSurface::Inline,
            PersistErrorKind::Network | PersistErrorKind::Validation => ErrorSurface::UserFacing,
        };
    }
    let lower = err.message.to_lowercase();
    if NOISE_MARKERS.iter().any(|marker| lower.contains(marker)) {
        ErrorSurface::Inline
    } else {
        ErrorSurface::UserFacing
    }
}

/// Generic inline message substituted for suppressed backend noise.
const INLINE_FALLBACK: &str = "The record could not be saved. Please review the form and try again.";

/// Remote persistence operations. Shapes beyond the composite-record
/// contract are opaque to this engine.
pub trait PersistenceClient {
    fn create(&mut self, payload: &TransportPayload) -> std::result::Result<i64, PersistError>;
    fn update(
        &mut self,
        id: i64,
        payload: &TransportPayload,
    ) -> std::result::Result<(), PersistError>;
    fn fetch_for_edit(&mut self, id: i64) -> std::result::Result<Value, PersistError>;
}

/// Tunables for the submission flow.
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    /// Pause before the completion callback fires, letting the remote
    /// read-model settle. An acknowledged eventual-consistency workaround,
    /// not a guarantee. Zero in tests.
    pub settle_delay: Duration,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(400),
        }
    }
}

/// Callback fired with the persisted record id after a successful save.
pub type CompletionHook = Box<dyn FnMut(i64)>;

/// Handle for a dispatched persistence call.
///
/// Stamped with the wizard generation at dispatch time; [`resolve`]
/// discards the outcome when the wizard was closed in between.
///
/// [`resolve`]: SubmissionOrchestrator::resolve
#[derive(Debug, Clone, Copy)]
pub struct SubmitTicket {
    mode: SubmitMode,
    record_id: Option<i64>,
    generation: u64,
}

impl SubmitTicket {
    pub fn mode(&self) -> SubmitMode {
        self.mode
    }

    /// The bound record id: `Some` means the call must be an update,
    /// `None` a create.
    pub fn record_id(&self) -> Option<i64> {
        self.record_id
    }
}

/// Drives the `idle -> validating -> persisting -> {success, failed}`
/// machine around the persistence client.
pub struct SubmissionOrchestrator {
    phase: SubmissionPhase,
    /// Bumped on close; a result captured under an older generation is
    /// discarded instead of written back into torn-down state.
    generation: u64,
    options: SubmitOptions,
    on_complete: Option<CompletionHook>,
    inline_error: Option<String>,
    user_error: Option<String>,
}

impl Default for SubmissionOrchestrator {
    fn default() -> Self {
        Self::new(SubmitOptions::default())
    }
}

impl SubmissionOrchestrator {
    pub fn new(options: SubmitOptions) -> Self {
        Self {
            phase: SubmissionPhase::Idle,
            generation: 0,
            options,
            on_complete: None,
            inline_error: None,
            user_error: None,
        }
    }

    /// Register the caller's completion callback (e.g. refresh the parent
    /// list view).
    pub fn set_on_complete(&mut self, hook: CompletionHook) {
        self.on_complete = Some(hook);
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Suppressed backend noise, rendered as a generic inline form error.
    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    /// User-actionable persistence failure message.
    pub fn user_error(&self) -> Option<&str> {
        self.user_error.as_deref()
    }

    /// Fetch a record and extract it for edit-mode hydration.
    ///
    /// Returns a controller pre-populated with the extracted composite
    /// record; section adapters hydrate lazily as steps are visited.
    pub fn hydrate_for_edit(
        &mut self,
        client: &mut dyn PersistenceClient,
        id: i64,
    ) -> Result<StepController> {
        let record = client
            .fetch_for_edit(id)
            .map_err(|err| RecformError::persistence(err.message))?;
        let extracted = extract_employee_record(&record).ok_or_else(|| {
            RecformError::hydration(format!("record {id} has no recognizable section data"))
        })?;
        debug!(id, sections = extracted.len(), "hydrated record for edit");
        Ok(StepController::new_edit(id, extracted))
    }

    /// First half of a submission: gather, validate and encode.
    ///
    /// Both modes gather authoritative data for every visited-or-current
    /// step and build the payload; a full submission must have the
    /// confirmation gate open. On success the controller is marked busy and
    /// the returned ticket must be settled through [`Self::resolve`].
    pub fn prepare(
        &mut self,
        controller: &mut StepController,
        registry: &mut AdapterRegistry,
        mode: SubmitMode,
    ) -> Result<(SubmitTicket, TransportPayload)> {
        if controller.is_busy() {
            return Err(RecformError::state("a submission is already in flight"));
        }
        if mode == SubmitMode::Full && !controller.confirm_open() {
            return Err(RecformError::navigation(
                "full submission requires the confirmation gate to be open",
            ));
        }

        self.phase = SubmissionPhase::Validating;
        self.inline_error = None;
        self.user_error = None;

        controller.collect_all(registry);
        let payload = match build_payload(controller.record(), mode) {
            Ok(payload) => payload,
            Err(err) => {
                self.phase = SubmissionPhase::Failed;
                self.user_error = Some(err.to_string());
                return Err(err.into());
            }
        };
        let transport = payload.to_transport();

        self.phase = SubmissionPhase::Persisting;
        controller.set_busy(true);
        let ticket = SubmitTicket {
            mode,
            record_id: controller.mode().record_id(),
            generation: self.generation,
        };
        Ok((ticket, transport))
    }

    /// Second half of a submission: apply the persistence outcome.
    ///
    /// A ticket stamped before a [`Self::close`] is stale: its outcome is
    /// discarded without touching the (already torn-down) wizard state, and
    /// the completion hook does not fire.
    pub fn resolve(
        &mut self,
        controller: &mut StepController,
        registry: &mut AdapterRegistry,
        ticket: SubmitTicket,
        outcome: std::result::Result<i64, PersistError>,
    ) -> Result<i64> {
        if ticket.generation != self.generation {
            warn!("wizard closed while a persistence call was in flight; discarding result");
            return Err(RecformError::state("wizard closed during submission"));
        }
        controller.set_busy(false);

        match outcome {
            Ok(id) => {
                self.phase = SubmissionPhase::Success;
                info!(id, mode = ?ticket.mode, "record persisted");
                controller.teardown();
                registry.reset_all();
                if !self.options.settle_delay.is_zero() {
                    std::thread::sleep(self.options.settle_delay);
                }
                if let Some(hook) = self.on_complete.as_mut() {
                    hook(id);
                }
                Ok(id)
            }
            Err(err) => {
                self.phase = SubmissionPhase::Failed;
                match classify_persist_error(&err) {
                    ErrorSurface::Inline => {
                        debug!(raw = %err.message, "suppressing backend noise");
                        self.inline_error = Some(INLINE_FALLBACK.to_string());
                        Err(RecformError::persistence(INLINE_FALLBACK))
                    }
                    ErrorSurface::UserFacing => {
                        self.user_error = Some(err.message.clone());
                        Err(RecformError::persistence(err.message))
                    }
                }
            }
        }
    }

    /// Run one draft save or full submission against a blocking client:
    /// [`Self::prepare`], the persistence call, [`Self::resolve`].
    pub fn submit(
        &mut self,
        controller: &mut StepController,
        registry: &mut AdapterRegistry,
        client: &mut dyn PersistenceClient,
        mode: SubmitMode,
    ) -> Result<i64> {
        let (ticket, transport) = self.prepare(controller, registry, mode)?;
        let outcome = match ticket.record_id() {
            Some(id) => client.update(id, &transport).map(|()| id),
            None => client.create(&transport),
        };
        self.resolve(controller, registry, ticket, outcome)
    }

    /// Close the wizard: invalidate in-flight results and reset the phase.
    pub fn close(&mut self, controller: &mut StepController, registry: &mut AdapterRegistry) {
        self.generation = self.generation.wrapping_add(1);
        self.phase = SubmissionPhase::Idle;
        self.inline_error = None;
        self.user_error = None;
        controller.teardown();
        registry.reset_all();
    }
}

// ============================================================================
// Session facade
// ============================================================================

/// One open wizard: controller, adapters, orchestrator and client bundled
/// behind a single lifecycle.
pub struct WizardSession<C: PersistenceClient> {
    controller: StepController,
    registry: AdapterRegistry,
    orchestrator: SubmissionOrchestrator,
    client: C,
}

impl<C: PersistenceClient> std::fmt::Debug for WizardSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardSession").finish_non_exhaustive()
    }
}

impl<C: PersistenceClient> WizardSession<C> {
    /// Open a create-mode wizard over an empty record.
    pub fn create(client: C) -> Self {
        Self {
            controller: StepController::new_create(),
            registry: AdapterRegistry::new(),
            orchestrator: SubmissionOrchestrator::default(),
            client,
        }
    }

    /// Open an edit-mode wizard, fetching and extracting the record.
    pub fn edit(mut client: C, id: i64) -> Result<Self> {
        let mut orchestrator = SubmissionOrchestrator::default();
        let controller = orchestrator.hydrate_for_edit(&mut client, id)?;
        Ok(Self {
            controller,
            registry: AdapterRegistry::new(),
            orchestrator,
            client,
        })
    }

    pub fn with_options(mut self, options: SubmitOptions) -> Self {
        self.orchestrator.options = options;
        self
    }

    pub fn on_complete(&mut self, hook: CompletionHook) {
        self.orchestrator.set_on_complete(hook);
    }

    pub fn register_adapter(
        &mut self,
        step: WizardStep,
        adapter: Box<dyn SectionAdapter>,
    ) -> Result<()> {
        self.registry.register(step, adapter)
    }

    pub fn controller(&self) -> &StepController {
        &self.controller
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.orchestrator.phase()
    }

    pub fn inline_error(&self) -> Option<&str> {
        self.orchestrator.inline_error()
    }

    pub fn user_error(&self) -> Option<&str> {
        self.orchestrator.user_error()
    }

    pub fn next(&mut self) -> Result<WizardStep> {
        self.controller.next(&mut self.registry)
    }

    pub fn back(&mut self) -> Result<WizardStep> {
        self.controller.back(&mut self.registry)
    }

    pub fn jump_to(&mut self, step: WizardStep) -> Result<WizardStep> {
        self.controller.jump_to(step, &mut self.registry)
    }

    pub fn open_confirm(&mut self) -> Result<()> {
        self.controller.open_confirm()
    }

    pub fn cancel_confirm(&mut self) {
        self.controller.cancel_confirm();
    }

    /// Save an incomplete record, bypassing the required-field gate.
    pub fn save_draft(&mut self) -> Result<i64> {
        self.orchestrator.submit(
            &mut self.controller,
            &mut self.registry,
            &mut self.client,
            SubmitMode::Draft,
        )
    }

    /// Run the confirmed full submission.
    pub fn submit(&mut self) -> Result<i64> {
        self.orchestrator.submit(
            &mut self.controller,
            &mut self.registry,
            &mut self.client,
            SubmitMode::Full,
        )
    }

    /// Close the wizard and discard all transient state.
    pub fn close(&mut self) {
        self.orchestrator.close(&mut self.controller, &mut self.registry);
    }
}
