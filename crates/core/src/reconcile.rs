//! Import reconciliation.
//!
//! Merges a batch of candidate records into the existing collection. Each
//! candidate with a usable name is matched against the collection by folded
//! name (trimmed, case-insensitive); what happens on a collision is decided
//! by a caller-supplied per-name [`DuplicateAction`], defaulting to
//! [`DuplicateAction::AddAlongside`] so an absent decision never blocks the
//! user.
//!
//! Candidates are processed in array order against the *working* collection:
//! existing records plus records inserted earlier in the same batch, with
//! replacements applied in place. A later same-named candidate with
//! `Replace` therefore updates whatever that name currently resolves to,
//! which collapses batch-internal duplicates via last-wins instead of
//! multiplying them.
//!
//! Decisions are keyed by medicine *name*, not id: candidates do not have
//! ids yet, and name-based collision is the business rule.
//!
//! Importing is also committing: every import persists the full new
//! collection through the injected [`CollectionStore`] as its side effect.
//! There is no staging step beyond the caller having resolved decisions
//! (typically after a [`find_duplicates`] preview).

use crate::record::{name_key, BackupDraft, MedicineDraft, MedicineRecord};
use crate::store::CollectionStore;
use crate::tags::process_tags_for_import;
use apteczka_types::{NonEmptyText, RecordId};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// How a name collision is resolved for one candidate name.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateAction {
    /// Overwrite the matching existing record in place.
    Replace,
    /// Insert the candidate as a new record next to the existing one.
    #[serde(rename = "add")]
    AddAlongside,
    /// Drop the candidate entirely.
    Skip,
}

impl FromStr for DuplicateAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace" => Ok(DuplicateAction::Replace),
            "add" => Ok(DuplicateAction::AddAlongside),
            "skip" => Ok(DuplicateAction::Skip),
            other => Err(format!(
                "unknown duplicate action '{other}' (expected replace, add, or skip)"
            )),
        }
    }
}

/// Per-name duplicate decisions.
///
/// Keys are folded with the same name-key function used for collision
/// detection, so `"apap"` resolves decisions for a candidate named
/// `" Apap "`. A name with no entry defaults to
/// [`DuplicateAction::AddAlongside`].
#[derive(Clone, Debug, Default)]
pub struct DuplicateDecisions {
    by_name: HashMap<String, DuplicateAction>,
}

impl DuplicateDecisions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the decision for a medicine name.
    pub fn set(&mut self, name: &str, action: DuplicateAction) {
        self.by_name.insert(name_key(name), action);
    }

    /// The decision for a name, defaulting to `AddAlongside`.
    pub fn decision_for(&self, name: &str) -> DuplicateAction {
        self.by_name
            .get(&name_key(name))
            .copied()
            .unwrap_or(DuplicateAction::AddAlongside)
    }
}

impl FromIterator<(String, DuplicateAction)> for DuplicateDecisions {
    fn from_iter<I: IntoIterator<Item = (String, DuplicateAction)>>(iter: I) -> Self {
        let mut decisions = Self::new();
        for (name, action) in iter {
            decisions.set(&name, action);
        }
        decisions
    }
}

/// A candidate record offered to collision detection.
pub trait ImportCandidate {
    /// Raw candidate name as supplied by the source, if any.
    fn candidate_name(&self) -> Option<&str>;

    /// Folded comparison key; `None` when the candidate has no usable name.
    fn name_key(&self) -> Option<String> {
        let key = name_key(self.candidate_name()?);
        (!key.is_empty()).then_some(key)
    }
}

impl ImportCandidate for MedicineDraft {
    fn candidate_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl ImportCandidate for BackupDraft {
    fn candidate_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// One detected name collision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateMatch {
    /// The candidate's name, trimmed, original casing.
    pub name: NonEmptyText,
    /// Id of the first matching existing record.
    pub existing_id: RecordId,
}

/// Detects name collisions between a candidate batch and the collection.
///
/// Candidates without a usable name are skipped entirely; they are always
/// treated as new, distinct inserts. For each remaining candidate the
/// **first** existing record with the same folded name is reported (ties
/// between same-named existing records resolve by collection order; this is
/// implementation-defined, not a contract). Candidates without a match are
/// omitted. Side-effect-free.
pub fn find_duplicates<C: ImportCandidate>(
    candidates: &[C],
    existing: &[MedicineRecord],
) -> Vec<DuplicateMatch> {
    let mut matches = Vec::new();
    for candidate in candidates {
        let Some(key) = candidate.name_key() else {
            continue;
        };
        let matching = existing
            .iter()
            .find(|record| record.name_key().as_deref() == Some(key.as_str()));
        if let Some(record) = matching {
            // name_key() being Some guarantees a non-blank name.
            let Ok(name) = NonEmptyText::new(candidate.candidate_name().unwrap_or_default())
            else {
                continue;
            };
            matches.push(DuplicateMatch {
                name,
                existing_id: record.id.clone(),
            });
        }
    }
    matches
}

/// Outcome of an import: the full new collection plus the records freshly
/// inserted by this batch (for caller notification). Replaced records are
/// not listed as inserted; inserted entries reflect their final post-batch
/// state.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportOutcome {
    pub collection: Vec<MedicineRecord>,
    pub inserted: Vec<MedicineRecord>,
}

/// Removes a record by id. The simple explicit-delete operation.
pub fn remove_record(collection: Vec<MedicineRecord>, id: &RecordId) -> Vec<MedicineRecord> {
    collection
        .into_iter()
        .filter(|record| &record.id != id)
        .collect()
}

/// Merge policy over an injected collection store.
pub struct ImportService<S> {
    store: S,
}

impl<S: CollectionStore> ImportService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Imports a batch of fresh candidates, resolving collisions per the
    /// supplied decisions.
    ///
    /// Every candidate's tags pass through normalization and expansion
    /// first. Then, per candidate in array order:
    ///
    /// - no usable name → fresh insert, decisions are irrelevant;
    /// - `Replace` with a match in the working collection → the match's
    ///   mutable fields (`description`, `indications`, `tags`,
    ///   `userLabelIds`, `note`) are overwritten; `id`, `dateAdded` and
    ///   `expiryDate` stay untouched;
    /// - `Skip` → the candidate is dropped;
    /// - otherwise → fresh insert with a generated id and `dateAdded` set
    ///   to now.
    ///
    /// Persists the new collection through the store before returning.
    pub fn import_with_duplicate_handling(
        &self,
        candidates: &[MedicineDraft],
        existing: Vec<MedicineRecord>,
        decisions: &DuplicateDecisions,
    ) -> ImportOutcome {
        let mut collection = existing;
        let mut inserted_ids: Vec<RecordId> = Vec::new();

        for candidate in candidates {
            let tags = process_tags_for_import(&candidate.tags);
            let key = ImportCandidate::name_key(candidate);

            if let Some(key) = key.as_deref() {
                let action = decisions.decision_for(key);
                if action == DuplicateAction::Replace {
                    if let Some(record) = find_by_key_mut(&mut collection, key) {
                        tracing::debug!(name = key, id = %record.id, "replacing existing record");
                        record.description = candidate.description.clone();
                        record.indications = candidate.indications.clone();
                        record.tags = tags;
                        record.user_label_ids = candidate.user_label_ids.clone();
                        record.note = candidate.note.clone();
                        continue;
                    }
                }
                if action == DuplicateAction::Skip {
                    tracing::debug!(name = key, "skipping candidate");
                    continue;
                }
            }

            let record = MedicineRecord {
                id: RecordId::generate(),
                name: candidate.name.clone(),
                description: candidate.description.clone(),
                indications: candidate.indications.clone(),
                tags,
                user_label_ids: candidate.user_label_ids.clone(),
                note: candidate.note.clone(),
                expiry_date: None,
                date_added: Utc::now(),
            };
            inserted_ids.push(record.id.clone());
            collection.push(record);
        }

        self.commit(collection, inserted_ids)
    }

    /// Imports a batch restored from a backup export.
    ///
    /// Same merge loop as [`Self::import_with_duplicate_handling`] with
    /// backup identity semantics:
    ///
    /// - on insert the candidate's own id is always discarded and a fresh
    ///   one generated (identifiers never cross devices); `dateAdded` is
    ///   reused from the candidate when present, else set to now;
    /// - on replace only the existing record's `id` is preserved; every
    ///   other field, including `dateAdded` and `expiryDate`, is
    ///   overwritten from the candidate.
    pub fn import_backup(
        &self,
        candidates: &[BackupDraft],
        existing: Vec<MedicineRecord>,
        decisions: &DuplicateDecisions,
    ) -> ImportOutcome {
        let mut collection = existing;
        let mut inserted_ids: Vec<RecordId> = Vec::new();

        for candidate in candidates {
            let tags = process_tags_for_import(&candidate.tags);
            let key = ImportCandidate::name_key(candidate);

            if let Some(key) = key.as_deref() {
                let action = decisions.decision_for(key);
                if action == DuplicateAction::Replace {
                    if let Some(record) = find_by_key_mut(&mut collection, key) {
                        tracing::debug!(name = key, id = %record.id, "restoring over existing record");
                        record.name = candidate.name.clone();
                        record.description = candidate.description.clone();
                        record.indications = candidate.indications.clone();
                        record.tags = tags;
                        record.user_label_ids = candidate.user_label_ids.clone();
                        record.note = candidate.note.clone();
                        record.expiry_date = candidate.expiry_date;
                        record.date_added = candidate.date_added.unwrap_or_else(Utc::now);
                        continue;
                    }
                }
                if action == DuplicateAction::Skip {
                    tracing::debug!(name = key, "skipping candidate");
                    continue;
                }
            }

            let record = MedicineRecord {
                id: RecordId::generate(),
                name: candidate.name.clone(),
                description: candidate.description.clone(),
                indications: candidate.indications.clone(),
                tags,
                user_label_ids: candidate.user_label_ids.clone(),
                note: candidate.note.clone(),
                expiry_date: candidate.expiry_date,
                date_added: candidate.date_added.unwrap_or_else(Utc::now),
            };
            inserted_ids.push(record.id.clone());
            collection.push(record);
        }

        self.commit(collection, inserted_ids)
    }

    fn commit(&self, collection: Vec<MedicineRecord>, inserted_ids: Vec<RecordId>) -> ImportOutcome {
        let inserted = collection
            .iter()
            .filter(|record| inserted_ids.contains(&record.id))
            .cloned()
            .collect();
        self.store.save(&collection);
        ImportOutcome {
            collection,
            inserted,
        }
    }
}

fn find_by_key_mut<'a>(
    collection: &'a mut [MedicineRecord],
    key: &str,
) -> Option<&'a mut MedicineRecord> {
    collection
        .iter_mut()
        .find(|record| record.name_key().as_deref() == Some(key))
}
