//! Composite record and section data types.
//!
//! The wizard assembles one [`CompositeRecord`] across its data steps. Each
//! section stores its raw extracted data keyed by [`SectionKey`]; the record
//! is never partially persisted — it is consumed once by the payload builder
//! at submission time and discarded when the wizard closes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use strum::{Display, EnumIter, EnumString};

/// Key of one logical section of the composite record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SectionKey {
    General,
    Address,
    Position,
    EmploymentType,
    Attainment,
    Account,
    Contact,
    File,
}

impl SectionKey {
    /// Sections whose data is a list rather than a single object.
    pub const fn is_multi_valued(self) -> bool {
        matches!(self, Self::Contact | Self::File)
    }
}

/// A binary file staged for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl BinaryFile {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A section attachment: either already persisted server-side (a URL) or a
/// binary that still needs to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// Already on the server; signals "do not re-upload".
    Url(String),
    /// Pending upload.
    Binary(BinaryFile),
}

impl Attachment {
    pub const fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }
}

/// One entry of the file section.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    /// Raw type identifier as the section produced it; normalized later.
    pub type_id: Value,
    pub attachment: Option<Attachment>,
}

impl FileEntry {
    pub fn new(type_id: impl Into<Value>, attachment: Option<Attachment>) -> Self {
        Self {
            type_id: type_id.into(),
            attachment,
        }
    }
}

/// Raw data extracted from one section.
///
/// Object sections produce `Single`, contacts produce `Many`, and the file
/// section produces `Files` (binaries cannot ride inside a JSON value).
#[derive(Debug, Clone, PartialEq)]
pub enum SectionData {
    Single(Value),
    Many(Vec<Value>),
    Files(Vec<FileEntry>),
}

impl SectionData {
    /// Convenience constructor for object sections.
    pub fn object(value: Value) -> Self {
        Self::Single(value)
    }

    /// True when the data carries nothing worth storing.
    ///
    /// An adapter that reports success with empty data must not erase what a
    /// previous visit stored, so the record skips merging empty extractions.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(value) => match value {
                Value::Null => true,
                Value::Object(map) => map.is_empty(),
                Value::Array(items) => items.is_empty(),
                Value::String(s) => s.is_empty(),
                _ => false,
            },
            Self::Many(items) => items.is_empty(),
            Self::Files(entries) => entries.is_empty(),
        }
    }

    /// The single object value, if this is an object section.
    pub fn as_object(&self) -> Option<&Value> {
        match self {
            Self::Single(value) => Some(value),
            _ => None,
        }
    }

    /// The list of values, if this is a multi-valued section.
    pub fn as_many(&self) -> Option<&[Value]> {
        match self {
            Self::Many(items) => Some(items),
            _ => None,
        }
    }

    /// The file entries, if this is the file section.
    pub fn as_files(&self) -> Option<&[FileEntry]> {
        match self {
            Self::Files(entries) => Some(entries),
            _ => None,
        }
    }
}

/// The full in-progress multi-section record.
///
/// Owned exclusively by the step controller while the wizard is open. Built
/// incrementally in create mode, or pre-populated by one hydration pass in
/// edit mode, then mutated step by step as the user advances and returns.
#[derive(Debug, Clone, Default)]
pub struct CompositeRecord {
    sections: BTreeMap<SectionKey, SectionData>,
}

impl CompositeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store extracted data for a section.
    ///
    /// Empty data is ignored so that revisiting a step without changes never
    /// wipes previously stored values. Returns whether the merge happened.
    pub fn merge(&mut self, key: SectionKey, data: SectionData) -> bool {
        if data.is_empty() {
            tracing::debug!(section = %key, "skipping empty section merge");
            return false;
        }
        self.sections.insert(key, data);
        true
    }

    pub fn get(&self, key: SectionKey) -> Option<&SectionData> {
        self.sections.get(&key)
    }

    pub fn contains(&self, key: SectionKey) -> bool {
        self.sections.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Discard everything. Called on wizard close, success or cancel.
    pub fn clear(&mut self) {
        self.sections.clear();
    }

    /// Iterate stored sections in key order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionKey, &SectionData)> {
        self.sections.iter().map(|(k, v)| (*k, v))
    }
}
