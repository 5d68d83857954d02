//! Payload builder and validator.
//!
//! Consumes the composite record once at submission time: resolves every
//! outgoing field through the normalizers, enforces the cross-section
//! required-field policy, applies the contact and file retention policies,
//! and produces the server-ready payload in either JSON or multipart form.
//!
//! Validation is collect-then-report: every missing or malformed field
//! contributes its own field-named message, because independent sections
//! fail independently and the caller must be able to report all of them.

use crate::contact::{ContactLine, normalize_contacts};
use crate::extract::{normalize_id_field, normalize_section};
use crate::section::{Attachment, BinaryFile, CompositeRecord, FileEntry, SectionKey};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Binaries above this size are treated as absent, not as a hard failure.
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// Required fields spanning the general, position, employment, attainment
/// and address sections. Presence is enforced on full submission only.
pub const REQUIRED_FIELDS: &[(SectionKey, &str)] = &[
    (SectionKey::General, "code"),
    (SectionKey::General, "first_name"),
    (SectionKey::General, "last_name"),
    (SectionKey::General, "prefix_id"),
    (SectionKey::General, "religion_id"),
    (SectionKey::General, "id_number"),
    (SectionKey::General, "birth_date"),
    (SectionKey::General, "civil_status"),
    (SectionKey::General, "gender"),
    (SectionKey::Position, "position_id"),
    (SectionKey::Position, "schedule_id"),
    (SectionKey::Position, "job_level_id"),
    (SectionKey::Position, "job_rate"),
    (SectionKey::EmploymentType, "employment_type_label"),
    (SectionKey::EmploymentType, "employment_start_date"),
    (SectionKey::Address, "region_id"),
    (SectionKey::Address, "province_id"),
    (SectionKey::Address, "city_municipality_id"),
    (SectionKey::Address, "barangay_id"),
    (SectionKey::Attainment, "attainment_id"),
];

/// Submission mode. Draft relaxes the required-field gate; format checks on
/// values that are present still apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitMode {
    Draft,
    #[default]
    Full,
}

/// Aggregated, field-named payload construction failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("payload validation failed: {}", issues.join("; "))]
pub struct PayloadError {
    /// One message per failing field, e.g. `general.birth_date is required`.
    pub issues: Vec<String>,
}

impl From<PayloadError> for crate::error::RecformError {
    fn from(err: PayloadError) -> Self {
        Self::Payload(err.to_string())
    }
}

/// A file retained for upload: non-zero type id, non-empty binary.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_type_id: i64,
    pub file: BinaryFile,
}

/// The flattened, validated, server-ready record.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPayload {
    pub mode: SubmitMode,
    /// Scalar fields, flattened across sections. Id fields are integers or null.
    pub fields: Map<String, Value>,
    pub contacts: Vec<ContactLine>,
    pub files: Vec<FileUpload>,
}

/// Transport encoding of a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportPayload {
    /// Plain JSON object; used when no binary attachments ride along.
    Json(Value),
    /// Multipart form with indexed array-style keys.
    Multipart(MultipartForm),
}

/// Multipart form data: ordered named parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    pub parts: Vec<FormPart>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartValue {
    Text(String),
    File(BinaryFile),
}

impl MultipartForm {
    fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::Text(value.into()),
        });
    }

    fn push_file(&mut self, name: impl Into<String>, file: BinaryFile) {
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::File(file),
        });
    }

    /// Find a part by name. Mostly useful in tests and logging.
    pub fn get(&self, name: &str) -> Option<&PartValue> {
        self.parts.iter().find(|p| p.name == name).map(|p| &p.value)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Apply the file retention policy to one entry.
///
/// Kept only with a non-zero type id and a non-empty binary attachment.
/// Oversized binaries are dropped with a warning — oversize means "this
/// attachment is absent", not "the form is invalid".
fn retain_file(index: usize, entry: &FileEntry) -> Option<FileUpload> {
    let file_type_id = normalize_id_field(&entry.type_id)?;
    let Some(Attachment::Binary(file)) = &entry.attachment else {
        return None; // URLs are already on the server; nothing to upload
    };
    if file.is_empty() {
        return None;
    }
    if file.len() > MAX_FILE_BYTES {
        tracing::warn!(
            index,
            file_name = %file.file_name,
            size = file.len(),
            "dropping oversized file attachment"
        );
        return None;
    }
    Some(FileUpload {
        file_type_id,
        file: file.clone(),
    })
}

/// Whether a normalized field value counts as missing.
fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Whether a job-rate value is an acceptable non-negative number.
fn is_valid_rate(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64().is_some_and(|f| f >= 0.0),
        Value::String(s) => s.trim().parse::<f64>().is_ok_and(|f| f >= 0.0),
        _ => false,
    }
}

/// Build the submission payload from the composite record.
///
/// Every failing field produces its own message; the error carries the full
/// list rather than stopping at the first problem.
pub fn build_payload(
    record: &CompositeRecord,
    mode: SubmitMode,
) -> Result<SubmissionPayload, PayloadError> {
    let mut fields = Map::new();
    let mut issues = Vec::new();

    // Flatten every object section through its normalizer
    for (key, data) in record.iter() {
        if let Some(section) = data.as_object()
            && let Some(Value::Object(normalized)) = normalize_section(key, section)
        {
            fields.extend(normalized);
        }
    }

    if mode == SubmitMode::Full {
        for (section, field) in REQUIRED_FIELDS {
            if is_missing(fields.get(*field)) {
                issues.push(format!("{section}.{field} is required"));
            }
        }
    }

    // Format checks apply to present values in both modes
    if let Some(rate) = fields.get("job_rate")
        && !rate.is_null()
        && !is_valid_rate(rate)
    {
        issues.push(format!("position.job_rate must be a number, got {rate}"));
    }

    let contacts = match record.get(SectionKey::Contact).and_then(|d| d.as_many()) {
        Some(raw_lines) => match normalize_contacts(raw_lines) {
            Ok(lines) => lines,
            Err(errors) => {
                issues.extend(errors.iter().map(ToString::to_string));
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let files = record
        .get(SectionKey::File)
        .and_then(|d| d.as_files())
        .map(|entries| {
            entries
                .iter()
                .enumerate()
                .filter_map(|(i, entry)| retain_file(i, entry))
                .collect()
        })
        .unwrap_or_default();

    if !issues.is_empty() {
        return Err(PayloadError { issues });
    }

    Ok(SubmissionPayload {
        mode,
        fields,
        contacts,
        files,
    })
}

// ============================================================================
// Transport encoding
// ============================================================================

/// Stringify a scalar for multipart transport.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl SubmissionPayload {
    /// Whether any section carries a binary attachment.
    pub fn has_binaries(&self) -> bool {
        !self.files.is_empty()
    }

    /// Encode for transport.
    ///
    /// With binaries aboard the payload must go out as multipart form data
    /// with indexed array-style keys; otherwise a plain JSON object is used.
    pub fn to_transport(&self) -> TransportPayload {
        if self.has_binaries() {
            TransportPayload::Multipart(self.to_multipart())
        } else {
            TransportPayload::Json(self.to_json())
        }
    }

    /// Plain JSON object encoding.
    pub fn to_json(&self) -> Value {
        let mut out = self.fields.clone();
        if self.mode == SubmitMode::Draft {
            out.insert("is_draft".into(), Value::Bool(true));
        }
        out.insert(
            "contacts".into(),
            Value::Array(
                self.contacts
                    .iter()
                    .map(|line| {
                        json!({
                            "contact_type": line.contact_type.to_string(),
                            "contact": line.transport,
                        })
                    })
                    .collect(),
            ),
        );
        Value::Object(out)
    }

    /// Multipart encoding: scalars stringified, list sections flattened into
    /// `contacts[i][field]` / `files[i][field]` keys.
    pub fn to_multipart(&self) -> MultipartForm {
        let mut form = MultipartForm::default();
        if self.mode == SubmitMode::Draft {
            form.push_text("is_draft", "1");
        }
        for (name, value) in &self.fields {
            if let Some(text) = stringify(value) {
                form.push_text(name.clone(), text);
            }
        }
        for (i, line) in self.contacts.iter().enumerate() {
            form.push_text(
                format!("contacts[{i}][contact_type]"),
                line.contact_type.to_string(),
            );
            form.push_text(format!("contacts[{i}][contact]"), line.transport.clone());
        }
        for (i, upload) in self.files.iter().enumerate() {
            form.push_text(
                format!("files[{i}][file_type_id]"),
                upload.file_type_id.to_string(),
            );
            form.push_file(format!("files[{i}][attachment]"), upload.file.clone());
        }
        form
    }
}
