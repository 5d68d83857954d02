//! recform
//!
//! Multi-step form orchestration and payload reconciliation for composite
//! personnel records: step navigation, section normalization, payload
//! assembly and submission sequencing.

pub mod adapter;
pub mod contact;
pub mod controller;
pub mod error;
pub mod extract;
pub mod payload;
pub mod section;
pub mod step;
pub mod submit;

// Re-export main types for convenience
pub use adapter::{AdapterRegistry, SectionAdapter, SectionOutcome};
pub use contact::{ContactError, ContactLine, ContactType, normalize_contacts, normalize_phone};
pub use controller::{StepController, WizardMode};
pub use error::{RecformError, Result};
pub use extract::{
    extract_employee_record, extract_field_value, normalize_id_field, normalize_section,
};
pub use payload::{
    FileUpload, FormPart, MAX_FILE_BYTES, MultipartForm, PartValue, PayloadError,
    REQUIRED_FIELDS, SubmissionPayload, SubmitMode, TransportPayload, build_payload,
};
pub use section::{Attachment, BinaryFile, CompositeRecord, FileEntry, SectionData, SectionKey};
pub use step::WizardStep;
pub use submit::{
    CompletionHook, ErrorSurface, PersistError, PersistErrorKind, PersistenceClient,
    SubmissionOrchestrator, SubmissionPhase, SubmitOptions, SubmitTicket, WizardSession,
    classify_persist_error,
};
