//! Contact line normalization.
//!
//! Contact lines are filtered to those with content; phone-like lines are
//! canonicalized to the Philippine mobile format. Accepted numbers render as
//! `9XX-XXX-XXXX` for display and `+63XXXXXXXXXX` for transport.

use crate::extract::{extract_field_value, trimmed_or_null};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

/// National dialing prefix stripped from raw phone input.
const NATIONAL_PREFIX: &str = "63";

/// Kind of a contact line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ContactType {
    #[default]
    Mobile,
    Landline,
    Email,
    Other,
}

impl ContactType {
    /// Whether raw input for this type is subjected to phone normalization.
    pub const fn is_phone_like(self) -> bool {
        matches!(self, Self::Mobile | Self::Landline)
    }
}

/// A contact line that passed normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLine {
    pub contact_type: ContactType,
    /// Canonical display form (`9XX-XXX-XXXX` for phones).
    pub contact: String,
    /// Transport form (`+63XXXXXXXXXX` for phones, otherwise the display form).
    pub transport: String,
}

/// Contact validation failure, tagged with the line's index so multiple
/// failing lines each get their own message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("contacts[{index}]: '{raw}' is not a valid mobile number")]
    InvalidPhone { index: usize, raw: String },
}

/// Strip a raw phone input down to its significant 10 digits.
///
/// Non-digits are removed, then the national prefix `63` or a leading `0`
/// is stripped. The remainder must be `9` followed by nine digits.
fn significant_digits(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let rest = if let Some(rest) = digits.strip_prefix(NATIONAL_PREFIX) {
        // "63" could also be the start of a bare number; only treat it as a
        // prefix when what remains is a full 10-digit subscriber number
        if rest.len() == 10 { rest } else { &digits }
    } else if let Some(rest) = digits.strip_prefix('0') {
        rest
    } else {
        &digits
    };
    let valid = rest.len() == 10
        && rest.starts_with('9')
        && rest.chars().all(|c| c.is_ascii_digit());
    valid.then(|| rest.to_string())
}

/// Canonical display form: `9XX-XXX-XXXX`.
fn display_form(digits: &str) -> String {
    format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

/// Transport form: `+63XXXXXXXXXX`.
fn transport_form(digits: &str) -> String {
    format!("+{NATIONAL_PREFIX}{digits}")
}

/// Normalize one raw phone input to its (display, transport) pair.
pub fn normalize_phone(raw: &str) -> Option<(String, String)> {
    let digits = significant_digits(raw)?;
    Some((display_form(&digits), transport_form(&digits)))
}

/// Normalize a list of raw contact values into canonical contact lines.
///
/// Lines without content are filtered out, not rejected. Phone-like lines
/// that fail normalization produce an index-specific error; all failing
/// indices are collected so the caller can report every one of them.
pub fn normalize_contacts(raw_lines: &[Value]) -> Result<Vec<ContactLine>, Vec<ContactError>> {
    let mut lines = Vec::new();
    let mut errors = Vec::new();

    for (index, raw) in raw_lines.iter().enumerate() {
        let Some(content) = extract_field_value(raw, &["contact", "value", "number"])
            .as_ref()
            .and_then(trimmed_or_null)
        else {
            continue; // no content: skip, don't reject
        };
        let contact_type = extract_field_value(raw, &["contact_type", "contactType", "type"])
            .as_ref()
            .and_then(trimmed_or_null)
            .and_then(|t| ContactType::from_str(&t).ok())
            .unwrap_or_default();

        if contact_type.is_phone_like() {
            match normalize_phone(&content) {
                Some((display, transport)) => lines.push(ContactLine {
                    contact_type,
                    contact: display,
                    transport,
                }),
                None => errors.push(ContactError::InvalidPhone {
                    index,
                    raw: content,
                }),
            }
        } else {
            lines.push(ContactLine {
                contact_type,
                transport: content.clone(),
                contact: content,
            });
        }
    }

    if errors.is_empty() { Ok(lines) } else { Err(errors) }
}
