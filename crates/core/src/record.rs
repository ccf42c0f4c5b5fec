//! Medicine record data model.
//!
//! Three shapes travel through the import pipeline:
//!
//! - [`MedicineRecord`]: the persisted entity. Always carries an id and a
//!   creation timestamp.
//! - [`MedicineDraft`]: a fresh-import candidate (OCR output or manual
//!   entry). Never carries an id or timestamp; the reconciler assigns both
//!   on insert.
//! - [`BackupDraft`]: a candidate restored from a prior export. May carry
//!   the id and timestamp of the device it came from.
//!
//! Field names serialise in camelCase so the JSON matches the payloads the
//! browser build reads and writes (`userLabelIds`, `dateAdded`,
//! `expiryDate`).
//!
//! Name-based collision detection compares a folded form of the name:
//! trimmed and lowercased. A record whose name is absent or blank never
//! participates in collision detection.

use apteczka_types::RecordId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Folds a medicine name into its collision-comparison key.
///
/// Trims surrounding whitespace and lowercases the remainder. An empty
/// result means the name does not qualify for collision detection.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn usable_name_key(name: Option<&str>) -> Option<String> {
    let key = name_key(name?);
    (!key.is_empty()).then_some(key)
}

/// A medicine record as stored in the collection.
///
/// Invariants: `id` is non-empty and unique within a collection;
/// `date_added` is assigned once at creation and never changed by updates.
/// Multiple records may share a `name`; name uniqueness is advisory only,
/// resolved per import by the user's duplicate decisions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineRecord {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub indications: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// References to user-defined labels. Opaque pass-through data: the
    /// core never invents, renames, or deletes labels.
    #[serde(default)]
    pub user_label_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    pub date_added: DateTime<Utc>,
}

impl MedicineRecord {
    /// Folded comparison key, or `None` when the record has no usable name.
    pub fn name_key(&self) -> Option<String> {
        usable_name_key(self.name.as_deref())
    }
}

/// A fresh-import candidate: the record shape produced by the OCR/lookup
/// pipeline and by manual entry.
///
/// Candidates lack `id` and `dateAdded`; the reconciler assigns both when it
/// inserts. `name` may be absent when the upstream source could not extract
/// one confidently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub indications: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub user_label_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A candidate restored from a backup export.
///
/// Carries the full record shape of the exporting device. The reconciler
/// discards the candidate `id` on insert (identifiers are never reused
/// across devices) and reuses `date_added` when present.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub indications: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub user_label_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<DateTime<Utc>>,
}
