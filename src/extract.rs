//! Field normalizer and data extractor.
//!
//! Bridges the impedance mismatch between the shapes a section's data can
//! arrive in: freshly entered form state, a server record loaded for edit,
//! `snake_case` vs `camelCase` field names, flat ids vs `{id}` objects vs
//! dotted paths.
//!
//! Everything in this module is a pure, deterministic transform — no I/O,
//! no side effects. The same candidate-resolution order works both for live
//! form state and for server-hydrated records.
//!
//! # Per-section rules
//!
//! | Section          | Special handling |
//! |------------------|------------------|
//! | general          | prefix/suffix/religion ids normalized; birth date to `YYYY-MM-DD` |
//! | address          | four location ids normalized; free text trimmed to null |
//! | position         | position/schedule/job-level ids normalized |
//! | employment_type  | label aliasing; probationary end date derived as start + 6 months |
//! | attainment       | program/degree/honor/attainment ids normalized; URL attachments dropped |
//! | account          | bank id normalized |

use crate::section::{Attachment, CompositeRecord, FileEntry, SectionData, SectionKey};
use chrono::{Months, NaiveDate};
use serde_json::{Map, Value};

/// Employment-type label whose end date is derived, never user-entered.
pub const PROBATIONARY_LABEL: &str = "PROBATIONARY";

/// Months added to the start date for probationary employment.
const PROBATIONARY_TERM_MONTHS: u32 = 6;

// ============================================================================
// Scalar resolution
// ============================================================================

/// Walk a dotted path through nested objects.
fn resolve_path<'a>(section: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = section;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Whether a resolved value counts as "absent".
fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Try each candidate key in order and return the first present value.
///
/// A key containing `.` is walked as a path. `null` and blank strings count
/// as absent. Order-preserving first-match; returns `None` when every
/// candidate is missing or empty.
pub fn extract_field_value(section: &Value, candidates: &[&str]) -> Option<Value> {
    for key in candidates {
        let resolved = if key.contains('.') {
            resolve_path(section, key)
        } else {
            section.as_object().and_then(|map| map.get(*key))
        };
        if let Some(value) = resolved
            && !is_absent(value)
        {
            return Some(value.clone());
        }
    }
    None
}

/// Canonicalize an identifier to a positive integer, or `None` when absent.
///
/// Accepts a raw number, a numeric string, and the `{id}` / `{value}` object
/// shapes. `0`, `"0"`, blank strings and `null` are all treated as absent —
/// an id field is never zero and never NaN.
pub fn normalize_id_field(value: &Value) -> Option<i64> {
    let id = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Object(map) => map
            .get("id")
            .or_else(|| map.get("value"))
            .and_then(normalize_id_field),
        _ => None,
    };
    id.filter(|id| *id > 0)
}

/// Trim a free-text value; blank becomes absent.
pub fn trimmed_or_null(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reformat a date-like string to `YYYY-MM-DD`.
///
/// Accepts `YYYY-MM-DD`, `MM/DD/YYYY`, and RFC3339 datetimes (the date part
/// wins). Anything else is absent.
pub fn normalize_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
        .or_else(|_| {
            // RFC3339 datetime: the leading ten characters are the date
            let prefix = trimmed.get(..10).unwrap_or("");
            NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
        })
        .ok()?;
    Some(parsed.format("%Y-%m-%d").to_string())
}

/// Derive the probationary end date: start + 6 calendar months.
pub fn derive_probationary_end(start: &str) -> Option<String> {
    let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d").ok()?;
    let end = start.checked_add_months(Months::new(PROBATIONARY_TERM_MONTHS))?;
    Some(end.format("%Y-%m-%d").to_string())
}

// ============================================================================
// Field helpers used by the per-section normalizers
// ============================================================================

fn id_value(section: &Value, candidates: &[&str]) -> Value {
    extract_field_value(section, candidates)
        .as_ref()
        .and_then(normalize_id_field)
        .map_or(Value::Null, Value::from)
}

fn text_value(section: &Value, candidates: &[&str]) -> Value {
    extract_field_value(section, candidates)
        .as_ref()
        .and_then(trimmed_or_null)
        .map_or(Value::Null, Value::from)
}

fn date_value(section: &Value, candidates: &[&str]) -> Value {
    extract_field_value(section, candidates)
        .as_ref()
        .and_then(trimmed_or_null)
        .as_deref()
        .and_then(normalize_date)
        .map_or(Value::Null, Value::from)
}

/// Raw non-empty scalar, kept as-is (numbers stay numbers).
fn scalar_value(section: &Value, candidates: &[&str]) -> Value {
    extract_field_value(section, candidates).unwrap_or(Value::Null)
}

// ============================================================================
// Per-section normalizers
// ============================================================================

/// Normalize the general-info section to its canonical outgoing shape.
pub fn normalize_general(section: &Value) -> Value {
    let mut out = Map::new();
    out.insert("code".into(), text_value(section, &["code", "employee_code"]));
    out.insert(
        "first_name".into(),
        text_value(section, &["first_name", "firstName"]),
    );
    out.insert(
        "middle_name".into(),
        text_value(section, &["middle_name", "middleName"]),
    );
    out.insert(
        "last_name".into(),
        text_value(section, &["last_name", "lastName"]),
    );
    out.insert(
        "prefix_id".into(),
        id_value(section, &["prefix_id", "prefixId", "prefix"]),
    );
    out.insert(
        "suffix_id".into(),
        id_value(section, &["suffix_id", "suffixId", "suffix"]),
    );
    out.insert(
        "religion_id".into(),
        id_value(section, &["religion_id", "religionId", "religion"]),
    );
    out.insert(
        "id_number".into(),
        text_value(section, &["id_number", "idNumber"]),
    );
    out.insert(
        "birth_date".into(),
        date_value(section, &["birth_date", "birthDate", "date_of_birth"]),
    );
    out.insert(
        "birth_place".into(),
        text_value(section, &["birth_place", "birthPlace"]),
    );
    out.insert(
        "civil_status".into(),
        text_value(section, &["civil_status", "civilStatus"]),
    );
    out.insert("gender".into(), text_value(section, &["gender", "sex"]));
    Value::Object(out)
}

/// Normalize the address section: four location ids, free text to null.
pub fn normalize_address(section: &Value) -> Value {
    let mut out = Map::new();
    out.insert(
        "region_id".into(),
        id_value(section, &["region_id", "regionId", "region"]),
    );
    out.insert(
        "province_id".into(),
        id_value(section, &["province_id", "provinceId", "province"]),
    );
    out.insert(
        "city_municipality_id".into(),
        id_value(
            section,
            &["city_municipality_id", "cityMunicipalityId", "city_municipality", "city"],
        ),
    );
    out.insert(
        "barangay_id".into(),
        id_value(section, &["barangay_id", "barangayId", "barangay"]),
    );
    out.insert(
        "street".into(),
        text_value(section, &["street", "street_address", "streetAddress"]),
    );
    out.insert(
        "zip_code".into(),
        text_value(section, &["zip_code", "zipCode", "postal_code"]),
    );
    out.insert(
        "remarks".into(),
        text_value(section, &["remarks", "address_remarks"]),
    );
    Value::Object(out)
}

/// Normalize the position section.
pub fn normalize_position(section: &Value) -> Value {
    let mut out = Map::new();
    out.insert(
        "position_id".into(),
        id_value(section, &["position_id", "positionId", "position"]),
    );
    out.insert(
        "schedule_id".into(),
        id_value(section, &["schedule_id", "scheduleId", "schedule"]),
    );
    out.insert(
        "job_level_id".into(),
        id_value(section, &["job_level_id", "jobLevelId", "job_level"]),
    );
    out.insert(
        "job_rate".into(),
        scalar_value(section, &["job_rate", "jobRate", "rate"]),
    );
    Value::Object(out)
}

/// Normalize the employment-type section.
///
/// The label arrives under either `employment_type` or
/// `employment_type_label`. When it is the probationary category the end
/// date is derived from the start date, overriding anything user-entered,
/// and is recomputed on every pass so a changed start date moves it.
pub fn normalize_employment_type(section: &Value) -> Value {
    let mut out = Map::new();
    let label = extract_field_value(
        section,
        &["employment_type_label", "employmentTypeLabel", "employment_type"],
    )
    .as_ref()
    .and_then(trimmed_or_null);
    let start = extract_field_value(
        section,
        &["employment_start_date", "employmentStartDate", "start_date"],
    )
    .as_ref()
    .and_then(trimmed_or_null)
    .as_deref()
    .and_then(normalize_date);

    let is_probationary = label
        .as_deref()
        .is_some_and(|l| l.eq_ignore_ascii_case(PROBATIONARY_LABEL));
    let end = if is_probationary {
        start.as_deref().and_then(derive_probationary_end)
    } else {
        extract_field_value(
            section,
            &["employment_end_date", "employmentEndDate", "end_date"],
        )
        .as_ref()
        .and_then(trimmed_or_null)
        .as_deref()
        .and_then(normalize_date)
    };

    out.insert(
        "employment_type_label".into(),
        label.map_or(Value::Null, Value::from),
    );
    out.insert(
        "employment_start_date".into(),
        start.map_or(Value::Null, Value::from),
    );
    out.insert(
        "employment_end_date".into(),
        end.map_or(Value::Null, Value::from),
    );
    Value::Object(out)
}

/// Normalize the attainment section.
///
/// An attachment that is a string URL is already on the server and is
/// dropped from outgoing data; it must not be mistaken for a pending upload.
pub fn normalize_attainment(section: &Value) -> Value {
    let mut out = Map::new();
    out.insert(
        "attainment_id".into(),
        id_value(section, &["attainment_id", "attainmentId", "attainment"]),
    );
    out.insert(
        "program_id".into(),
        id_value(section, &["program_id", "programId", "program"]),
    );
    out.insert(
        "degree_id".into(),
        id_value(section, &["degree_id", "degreeId", "degree"]),
    );
    out.insert(
        "honor_id".into(),
        id_value(section, &["honor_id", "honorId", "honor"]),
    );
    out.insert(
        "school".into(),
        text_value(section, &["school", "school_name", "schoolName"]),
    );
    if let Some(attachment) = extract_field_value(section, &["attachment", "attachment_url"])
        && !attachment.is_string()
    {
        out.insert("attachment".into(), attachment);
    }
    Value::Object(out)
}

/// Normalize the account section.
pub fn normalize_account(section: &Value) -> Value {
    let mut out = Map::new();
    out.insert("bank_id".into(), id_value(section, &["bank_id", "bankId", "bank"]));
    out.insert(
        "account_number".into(),
        text_value(section, &["account_number", "accountNumber"]),
    );
    Value::Object(out)
}

/// Dispatch to the normalizer for an object section.
///
/// Contacts and files carry list data with their own policies and are
/// handled by the payload builder, not here.
pub fn normalize_section(key: SectionKey, section: &Value) -> Option<Value> {
    match key {
        SectionKey::General => Some(normalize_general(section)),
        SectionKey::Address => Some(normalize_address(section)),
        SectionKey::Position => Some(normalize_position(section)),
        SectionKey::EmploymentType => Some(normalize_employment_type(section)),
        SectionKey::Attainment => Some(normalize_attainment(section)),
        SectionKey::Account => Some(normalize_account(section)),
        SectionKey::Contact | SectionKey::File => None,
    }
}

// ============================================================================
// Server-record extraction
// ============================================================================

/// One way a section may be nested inside a server record.
///
/// Strategies are probed in order; the first container that resolves to
/// usable data wins. A new server shape is supported by appending a
/// container key, not by branching deeper.
struct ContainerStrategy {
    key: SectionKey,
    containers: &'static [&'static str],
}

const EXTRACTION_STRATEGIES: &[ContainerStrategy] = &[
    ContainerStrategy {
        key: SectionKey::General,
        containers: &["general_info", "general", "employee_info"],
    },
    ContainerStrategy {
        key: SectionKey::Address,
        containers: &["addresses", "address", "employee_address"],
    },
    ContainerStrategy {
        key: SectionKey::Position,
        containers: &["position_details", "positions", "position"],
    },
    ContainerStrategy {
        key: SectionKey::EmploymentType,
        containers: &["employment_types", "employment_type_details", "employment_type"],
    },
    ContainerStrategy {
        key: SectionKey::Attainment,
        containers: &["educational_attainments", "attainments", "attainment", "educational_background"],
    },
    ContainerStrategy {
        key: SectionKey::Account,
        containers: &["accounts", "account", "payroll_account"],
    },
    ContainerStrategy {
        key: SectionKey::Contact,
        containers: &["contacts", "contact_details"],
    },
    ContainerStrategy {
        key: SectionKey::File,
        containers: &["files", "file_attachments", "attachments"],
    },
];

/// A non-empty object, or a one-element array collapsed to its sole object.
fn single_object(container: &Value) -> Option<Value> {
    match container {
        Value::Object(map) if !map.is_empty() => Some(container.clone()),
        Value::Array(items) if items.len() == 1 => single_object(&items[0]),
        _ => None,
    }
}

/// A non-empty array of objects (a one-element object is wrapped).
fn object_list(container: &Value) -> Option<Vec<Value>> {
    match container {
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| item.is_object().then(|| item.clone()))
            .collect(),
        Value::Object(map) if !map.is_empty() => Some(vec![container.clone()]),
        _ => None,
    }
}

/// Build a file entry from a server-side file object.
fn file_entry_from_server(item: &Value) -> FileEntry {
    let type_id = extract_field_value(item, &["file_type_id", "fileTypeId", "file_type", "type_id"])
        .unwrap_or(Value::Null);
    let attachment = extract_field_value(item, &["attachment", "attachment_url", "url", "path"])
        .as_ref()
        .and_then(trimmed_or_null)
        .map(Attachment::Url);
    FileEntry { type_id, attachment }
}

/// Extract a composite record from an ambiguous server payload.
///
/// Server records nest each section under one of several possible keys,
/// sometimes as arrays and sometimes as singular objects. Every section is
/// probed through its ordered strategy list; one-element arrays collapse to
/// their sole element for object sections, list sections keep their arrays.
///
/// Returns `None` when no section yields any data — the record shape is not
/// recognized.
pub fn extract_employee_record(record: &Value) -> Option<CompositeRecord> {
    let mut out = CompositeRecord::new();

    for strategy in EXTRACTION_STRATEGIES {
        for container_key in strategy.containers {
            let container = if container_key.contains('.') {
                resolve_path(record, container_key)
            } else {
                record.as_object().and_then(|map| map.get(*container_key))
            };
            let Some(container) = container else { continue };

            let data = match strategy.key {
                SectionKey::Contact => object_list(container).map(SectionData::Many),
                SectionKey::File => object_list(container).map(|items| {
                    SectionData::Files(items.iter().map(file_entry_from_server).collect())
                }),
                _ => single_object(container).map(SectionData::Single),
            };
            if let Some(data) = data
                && out.merge(strategy.key, data)
            {
                break;
            }
        }
    }

    // Flat record shape: general fields live at the root, no container at all
    if !out.contains(SectionKey::General)
        && extract_field_value(record, &["first_name", "last_name", "code"]).is_some()
    {
        out.merge(SectionKey::General, SectionData::Single(record.clone()));
    }

    if out.is_empty() {
        tracing::debug!("no section matched any extraction strategy");
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // =========================================================================
    // extract_field_value
    // =========================================================================

    #[test]
    fn test_first_match_wins() {
        let section = json!({"first_name": "Ana", "firstName": "Shadow"});
        assert_eq!(
            extract_field_value(&section, &["first_name", "firstName"]),
            Some(json!("Ana"))
        );
        // Order matters: reversed candidates pick the other key
        assert_eq!(
            extract_field_value(&section, &["firstName", "first_name"]),
            Some(json!("Shadow"))
        );
    }

    #[test]
    fn test_empty_and_null_skipped() {
        let section = json!({"a": "", "b": null, "c": "  ", "d": "value"});
        assert_eq!(
            extract_field_value(&section, &["a", "b", "c", "d"]),
            Some(json!("value"))
        );
        assert_eq!(extract_field_value(&section, &["a", "b", "c"]), None);
    }

    #[test]
    fn test_dotted_path_walks_nested_objects() {
        let section = json!({"position": {"detail": {"id": 7}}});
        assert_eq!(
            extract_field_value(&section, &["position.detail.id"]),
            Some(json!(7))
        );
        assert_eq!(extract_field_value(&section, &["position.missing.id"]), None);
    }

    #[test]
    fn test_missing_everywhere_is_none() {
        assert_eq!(extract_field_value(&json!({}), &["x", "y.z"]), None);
        assert_eq!(extract_field_value(&json!(null), &["x"]), None);
    }

    // =========================================================================
    // normalize_id_field
    // =========================================================================

    #[test]
    fn test_id_shapes() {
        assert_eq!(normalize_id_field(&json!(5)), Some(5));
        assert_eq!(normalize_id_field(&json!("5")), Some(5));
        assert_eq!(normalize_id_field(&json!({"id": 5})), Some(5));
        assert_eq!(normalize_id_field(&json!({"value": 5})), Some(5));
        assert_eq!(normalize_id_field(&json!({"id": "5"})), Some(5));
        assert_eq!(normalize_id_field(&json!(5.0)), Some(5));
    }

    #[test]
    fn test_id_absent_sentinels() {
        assert_eq!(normalize_id_field(&json!(0)), None);
        assert_eq!(normalize_id_field(&json!("0")), None);
        assert_eq!(normalize_id_field(&json!("")), None);
        assert_eq!(normalize_id_field(&json!(null)), None);
        assert_eq!(normalize_id_field(&json!({"id": 0})), None);
        assert_eq!(normalize_id_field(&json!(-3)), None);
        assert_eq!(normalize_id_field(&json!("abc")), None);
        assert_eq!(normalize_id_field(&json!(2.5)), None);
    }

    // =========================================================================
    // dates
    // =========================================================================

    #[test]
    fn test_date_formats() {
        assert_eq!(normalize_date("1990-12-05"), Some("1990-12-05".into()));
        assert_eq!(normalize_date("12/05/1990"), Some("1990-12-05".into()));
        assert_eq!(
            normalize_date("1990-12-05T00:00:00Z"),
            Some("1990-12-05".into())
        );
        assert_eq!(normalize_date("yesterday"), None);
        assert_eq!(normalize_date("  "), None);
    }

    #[test]
    fn test_probationary_end_is_plus_six_months() {
        assert_eq!(
            derive_probationary_end("2024-01-01"),
            Some("2024-07-01".into())
        );
        // Month-end clamping
        assert_eq!(
            derive_probationary_end("2024-08-31"),
            Some("2025-02-28".into())
        );
        assert_eq!(derive_probationary_end("bogus"), None);
    }

    // =========================================================================
    // section normalizers
    // =========================================================================

    #[test]
    fn test_general_normalization() {
        let section = json!({
            "code": " E-1001 ",
            "first_name": "Ana",
            "last_name": "Reyes",
            "prefix": {"id": 2},
            "religionId": "7",
            "suffix_id": 0,
            "id_number": "IDN-44",
            "birthDate": "12/05/1990",
            "civil_status": "single",
            "gender": "female"
        });
        let out = normalize_general(&section);
        assert_eq!(out["code"], json!("E-1001"));
        assert_eq!(out["prefix_id"], json!(2));
        assert_eq!(out["religion_id"], json!(7));
        assert_eq!(out["suffix_id"], json!(null));
        assert_eq!(out["birth_date"], json!("1990-12-05"));
    }

    #[test]
    fn test_address_blank_text_becomes_null() {
        let section = json!({
            "region": {"id": 1},
            "province_id": 2,
            "city": 3,
            "barangay_id": "4",
            "street": "   ",
            "zip_code": "4030"
        });
        let out = normalize_address(&section);
        assert_eq!(out["region_id"], json!(1));
        assert_eq!(out["province_id"], json!(2));
        assert_eq!(out["city_municipality_id"], json!(3));
        assert_eq!(out["barangay_id"], json!(4));
        assert_eq!(out["street"], json!(null));
        assert_eq!(out["zip_code"], json!("4030"));
    }

    #[test]
    fn test_employment_type_label_aliasing() {
        let via_label = json!({"employment_type_label": "Regular", "start_date": "2024-01-15"});
        let via_type = json!({"employment_type": "Regular", "start_date": "2024-01-15"});
        assert_eq!(
            normalize_employment_type(&via_label)["employment_type_label"],
            normalize_employment_type(&via_type)["employment_type_label"]
        );
    }

    #[test]
    fn test_probationary_end_derived_not_entered() {
        let section = json!({
            "employment_type_label": "PROBATIONARY",
            "employment_start_date": "2024-01-01",
            "employment_end_date": "2030-12-31"
        });
        let out = normalize_employment_type(&section);
        // User-entered end date is overridden by the derived one
        assert_eq!(out["employment_end_date"], json!("2024-07-01"));
    }

    #[test]
    fn test_probationary_end_recomputed_when_start_moves() {
        let mut section = json!({
            "employment_type_label": "probationary",
            "employment_start_date": "2024-01-01"
        });
        assert_eq!(
            normalize_employment_type(&section)["employment_end_date"],
            json!("2024-07-01")
        );
        section["employment_start_date"] = json!("2024-03-15");
        assert_eq!(
            normalize_employment_type(&section)["employment_end_date"],
            json!("2024-09-15")
        );
    }

    #[test]
    fn test_non_probationary_end_passes_through() {
        let section = json!({
            "employment_type_label": "Regular",
            "employment_start_date": "2024-01-01",
            "employment_end_date": "2025-01-01"
        });
        let out = normalize_employment_type(&section);
        assert_eq!(out["employment_end_date"], json!("2025-01-01"));
    }

    #[test]
    fn test_attainment_url_attachment_dropped() {
        let section = json!({
            "attainment": {"id": 3},
            "program_id": 9,
            "attachment": "https://files.example/tor.pdf"
        });
        let out = normalize_attainment(&section);
        assert_eq!(out["attainment_id"], json!(3));
        assert_eq!(out["program_id"], json!(9));
        // Server URLs signal "already uploaded" and never go back out
        assert!(out.get("attachment").is_none());
    }

    #[test]
    fn test_account_bank_id() {
        let out = normalize_account(&json!({"bank": {"id": 11}, "account_number": " 0012 "}));
        assert_eq!(out["bank_id"], json!(11));
        assert_eq!(out["account_number"], json!("0012"));
    }

    // =========================================================================
    // extract_employee_record
    // =========================================================================

    #[test]
    fn test_extracts_from_nested_containers() {
        let record = json!({
            "general_info": {"first_name": "Ana", "last_name": "Reyes"},
            "addresses": [{"region_id": 1}],
            "contacts": [
                {"contact_type": "mobile", "contact": "09171234567"},
                {"contact_type": "email", "contact": "ana@example.com"}
            ],
            "files": [{"file_type_id": 2, "attachment": "https://files.example/1.pdf"}]
        });
        let extracted = extract_employee_record(&record).unwrap();

        // One-element array collapses to its sole object
        let address = extracted.get(SectionKey::Address).unwrap();
        assert_eq!(address.as_object().unwrap()["region_id"], json!(1));

        // List sections keep their arrays
        assert_eq!(extracted.get(SectionKey::Contact).unwrap().as_many().unwrap().len(), 2);

        let files = extracted.get(SectionKey::File).unwrap().as_files().unwrap();
        assert_eq!(
            files[0].attachment,
            Some(Attachment::Url("https://files.example/1.pdf".into()))
        );
    }

    #[test]
    fn test_container_order_is_respected() {
        // Both containers present: the earlier strategy wins
        let record = json!({
            "general_info": {"first_name": "Primary"},
            "general": {"first_name": "Secondary"}
        });
        let extracted = extract_employee_record(&record).unwrap();
        let general = extracted.get(SectionKey::General).unwrap().as_object().unwrap();
        assert_eq!(general["first_name"], json!("Primary"));
    }

    #[test]
    fn test_flat_record_falls_back_to_root() {
        let record = json!({"first_name": "Flat", "last_name": "Shape"});
        let extracted = extract_employee_record(&record).unwrap();
        let general = extracted.get(SectionKey::General).unwrap().as_object().unwrap();
        assert_eq!(general["first_name"], json!("Flat"));
    }

    #[test]
    fn test_unrecognized_shape_is_none() {
        assert!(extract_employee_record(&json!({})).is_none());
        assert!(extract_employee_record(&json!("not an object")).is_none());
        assert!(extract_employee_record(&json!({"unrelated": [1, 2, 3]})).is_none());
    }

    #[test]
    fn test_multi_element_array_rejected_for_object_sections() {
        // Two position rows is not a recognizable singular section; the
        // strategy list falls through to the singular container.
        let record = json!({
            "positions": [{"position_id": 1}, {"position_id": 2}],
            "position": {"position_id": 3}
        });
        let extracted = extract_employee_record(&record).unwrap();
        let position = extracted.get(SectionKey::Position).unwrap().as_object().unwrap();
        assert_eq!(position["position_id"], json!(3));
    }
}
