//! Import and backup payloads.
//!
//! Both payload shapes share one envelope: `{ "leki": [ ... ] }`. A fresh
//! import (OCR output, manual entry) carries draft records without
//! identifiers; a backup carries the full record shape of the exporting
//! device, including `id` and `dateAdded`.
//!
//! Which shape a payload has is decided **once**, at this boundary, by a
//! heuristic sniff; there is no versioned format tag. The decision is then
//! carried as a tagged value ([`ImportPayload`]) so downstream code never
//! re-sniffs per record. Payloads that happen to satisfy the heuristic will
//! be misclassified; that window is accepted.
//!
//! Validation here is the upstream collaborator the reconciler relies on:
//! when `validate_payload` reports issues, the reconciler is never invoked
//! and the caller surfaces the issue list instead.

use crate::constants::PAYLOAD_RECORDS_KEY;
use crate::error::{CabinetError, CabinetResult};
use crate::record::{BackupDraft, MedicineDraft, MedicineRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Deserialize)]
struct FreshEnvelope {
    leki: Vec<MedicineDraft>,
}

#[derive(Deserialize)]
struct RestoreEnvelope {
    leki: Vec<BackupDraft>,
}

#[derive(Serialize)]
struct BackupEnvelope<'a> {
    leki: &'a [MedicineRecord],
}

/// The recognised payload shape, decided once at the boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PayloadFormat {
    /// Draft records without identifiers.
    Fresh,
    /// Full records from a prior export.
    Backup,
}

/// A parsed, shape-tagged import payload.
#[derive(Clone, Debug, PartialEq)]
pub enum ImportPayload {
    Fresh(Vec<MedicineDraft>),
    Backup(Vec<BackupDraft>),
}

impl ImportPayload {
    pub fn format(&self) -> PayloadFormat {
        match self {
            ImportPayload::Fresh(_) => PayloadFormat::Fresh,
            ImportPayload::Backup(_) => PayloadFormat::Backup,
        }
    }

    /// Number of candidate records in the payload.
    pub fn len(&self) -> usize {
        match self {
            ImportPayload::Fresh(drafts) => drafts.len(),
            ImportPayload::Backup(drafts) => drafts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single problem found while validating a payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationIssue {
    /// Dotted path of the offending value, e.g. `leki[2].tags`.
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Classifies a payload as fresh import or backup restore.
///
/// Backup iff the value is an object whose record array is non-empty and
/// whose **first** element carries both `id` and `dateAdded` as strings.
/// Everything else is treated as a fresh import.
pub fn classify_payload(value: &Value) -> PayloadFormat {
    let first = value
        .get(PAYLOAD_RECORDS_KEY)
        .and_then(Value::as_array)
        .and_then(|records| records.first());

    match first {
        Some(Value::Object(entry))
            if entry.get("id").is_some_and(Value::is_string)
                && entry.get("dateAdded").is_some_and(Value::is_string) =>
        {
            PayloadFormat::Backup
        }
        _ => PayloadFormat::Fresh,
    }
}

fn check_string(entry: &Value, path: &str, key: &str, issues: &mut Vec<ValidationIssue>) {
    if let Some(value) = entry.get(key) {
        if !value.is_string() && !value.is_null() {
            issues.push(ValidationIssue {
                field: format!("{path}.{key}"),
                message: "must be a string".into(),
            });
        }
    }
}

fn check_string_array(entry: &Value, path: &str, key: &str, issues: &mut Vec<ValidationIssue>) {
    let Some(value) = entry.get(key) else { return };
    match value.as_array() {
        Some(items) => {
            for (index, item) in items.iter().enumerate() {
                if !item.is_string() {
                    issues.push(ValidationIssue {
                        field: format!("{path}.{key}[{index}]"),
                        message: "must be a string".into(),
                    });
                }
            }
        }
        None => issues.push(ValidationIssue {
            field: format!("{path}.{key}"),
            message: "must be an array of strings".into(),
        }),
    }
}

/// Validates the shape of an import payload.
///
/// Returns the full list of problems found; an empty list means the payload
/// is safe to decode. The reconciler assumes its input passed this check.
pub fn validate_payload(value: &Value) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let Some(object) = value.as_object() else {
        issues.push(ValidationIssue {
            field: "payload".into(),
            message: "must be a JSON object".into(),
        });
        return issues;
    };

    let Some(records) = object.get(PAYLOAD_RECORDS_KEY) else {
        issues.push(ValidationIssue {
            field: PAYLOAD_RECORDS_KEY.into(),
            message: "missing record array".into(),
        });
        return issues;
    };

    let Some(records) = records.as_array() else {
        issues.push(ValidationIssue {
            field: PAYLOAD_RECORDS_KEY.into(),
            message: "must be an array".into(),
        });
        return issues;
    };

    for (index, entry) in records.iter().enumerate() {
        let path = format!("{PAYLOAD_RECORDS_KEY}[{index}]");
        if !entry.is_object() {
            issues.push(ValidationIssue {
                field: path,
                message: "must be an object".into(),
            });
            continue;
        }
        check_string(entry, &path, "id", &mut issues);
        check_string(entry, &path, "name", &mut issues);
        check_string(entry, &path, "description", &mut issues);
        check_string(entry, &path, "note", &mut issues);
        check_string(entry, &path, "dateAdded", &mut issues);
        check_string(entry, &path, "expiryDate", &mut issues);
        check_string_array(entry, &path, "indications", &mut issues);
        check_string_array(entry, &path, "tags", &mut issues);
        check_string_array(entry, &path, "userLabelIds", &mut issues);
    }

    issues
}

/// Decodes an already-validated payload into its tagged shape.
pub fn decode_payload(value: Value) -> CabinetResult<ImportPayload> {
    match classify_payload(&value) {
        PayloadFormat::Fresh => {
            let envelope: FreshEnvelope =
                serde_json::from_value(value).map_err(CabinetError::Deserialization)?;
            Ok(ImportPayload::Fresh(envelope.leki))
        }
        PayloadFormat::Backup => {
            let envelope: RestoreEnvelope =
                serde_json::from_value(value).map_err(CabinetError::Deserialization)?;
            Ok(ImportPayload::Backup(envelope.leki))
        }
    }
}

/// Parses raw payload text: JSON parse, shape validation, sniff, decode.
///
/// # Errors
///
/// `CabinetError::PayloadParse` for malformed JSON,
/// `CabinetError::InvalidPayload` when validation reports issues.
pub fn parse_payload(raw: &str) -> CabinetResult<ImportPayload> {
    let value: Value = serde_json::from_str(raw).map_err(CabinetError::PayloadParse)?;
    let issues = validate_payload(&value);
    if !issues.is_empty() {
        let joined = issues
            .iter()
            .map(ValidationIssue::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(CabinetError::InvalidPayload(joined));
    }
    decode_payload(value)
}

/// Renders the collection as a backup payload (pretty-printed JSON).
pub fn export_backup(records: &[MedicineRecord]) -> CabinetResult<String> {
    serde_json::to_string_pretty(&BackupEnvelope { leki: records })
        .map_err(CabinetError::Serialization)
}

#[cfg(test)]
mod payload_tests {
    use super::*;
    use apteczka_types::RecordId;
    use chrono::Utc;

    #[test]
    fn sniffs_backup_when_first_record_has_id_and_date() {
        let value: Value = serde_json::from_str(
            r#"{"leki": [{"id": "abc", "dateAdded": "2024-01-01T00:00:00Z", "name": "Apap"}]}"#,
        )
        .expect("valid json");
        assert_eq!(classify_payload(&value), PayloadFormat::Backup);
    }

    #[test]
    fn sniffs_fresh_for_records_without_identifiers() {
        let value: Value =
            serde_json::from_str(r#"{"leki": [{"name": "Apap"}]}"#).expect("valid json");
        assert_eq!(classify_payload(&value), PayloadFormat::Fresh);
    }

    #[test]
    fn sniffs_fresh_for_empty_record_array() {
        let value: Value = serde_json::from_str(r#"{"leki": []}"#).expect("valid json");
        assert_eq!(classify_payload(&value), PayloadFormat::Fresh);
    }

    #[test]
    fn sniffs_fresh_when_id_is_not_a_string() {
        let value: Value =
            serde_json::from_str(r#"{"leki": [{"id": 7, "dateAdded": "2024-01-01T00:00:00Z"}]}"#)
                .expect("valid json");
        assert_eq!(classify_payload(&value), PayloadFormat::Fresh);
    }

    #[test]
    fn validation_reports_missing_record_array() {
        let value: Value = serde_json::from_str(r#"{"inne": []}"#).expect("valid json");
        let issues = validate_payload(&value);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "leki");
    }

    #[test]
    fn validation_reports_ill_typed_fields_with_paths() {
        let value: Value = serde_json::from_str(
            r#"{"leki": [{"name": "Apap", "tags": "not-a-list"}, {"name": 3}]}"#,
        )
        .expect("valid json");
        let issues = validate_payload(&value);
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert!(fields.contains(&"leki[0].tags"));
        assert!(fields.contains(&"leki[1].name"));
    }

    #[test]
    fn parse_rejects_invalid_payloads() {
        let err = parse_payload(r#"{"leki": "nope"}"#).expect_err("expected rejection");
        assert!(matches!(err, CabinetError::InvalidPayload(_)));
    }

    #[test]
    fn parse_decodes_a_fresh_payload() {
        let payload = parse_payload(
            r#"{"leki": [{"name": "Apap", "description": "painkiller", "tags": ["ból głowy"]}]}"#,
        )
        .expect("valid payload");
        match payload {
            ImportPayload::Fresh(drafts) => {
                assert_eq!(drafts.len(), 1);
                assert_eq!(drafts[0].name.as_deref(), Some("Apap"));
            }
            ImportPayload::Backup(_) => panic!("expected fresh payload"),
        }
    }

    #[test]
    fn exported_backup_is_recognised_as_backup() {
        let records = vec![MedicineRecord {
            id: RecordId::generate(),
            name: Some("Apap".into()),
            description: String::new(),
            indications: vec![],
            tags: vec![],
            user_label_ids: vec![],
            note: None,
            expiry_date: None,
            date_added: Utc::now(),
        }];
        let raw = export_backup(&records).expect("export");
        let payload = parse_payload(&raw).expect("parse exported payload");
        assert_eq!(payload.format(), PayloadFormat::Backup);
        assert_eq!(payload.len(), 1);
    }
}
