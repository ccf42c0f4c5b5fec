//! Collection storage.
//!
//! The collection persists as a single JSON blob. The browser build keeps it
//! under one local-storage key; here the same blob lives in one file under
//! the data directory.
//!
//! The [`CollectionStore`] contract favours availability over strict
//! durability, appropriate for a purely local, low-stakes personal-data
//! tool:
//!
//! - `load` never fails: a missing or unparseable blob yields an empty
//!   collection (unparseable content is logged first).
//! - `save` is best-effort: failures are logged and swallowed, never
//!   surfaced to the caller.
//!
//! The fallible inner operations of [`JsonFileStore`] are kept separate
//! (`try_load`/`try_save`) so the swallow-and-log policy lives in exactly
//! one place, the trait impl.

use crate::config::CoreConfig;
use crate::error::{CabinetError, CabinetResult};
use crate::record::MedicineRecord;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Load/save contract for the medicine collection.
///
/// Injected into the import reconciler so the merge logic can be exercised
/// against an in-memory fake ([`MemoryStore`]) in tests.
pub trait CollectionStore {
    /// Loads the stored collection.
    ///
    /// Returns an empty list when nothing is stored or the stored content
    /// cannot be parsed.
    fn load(&self) -> Vec<MedicineRecord>;

    /// Persists the full collection, replacing whatever was stored before.
    ///
    /// Best-effort: failures are logged and swallowed.
    fn save(&self, records: &[MedicineRecord]);
}

/// File-backed store holding the collection as one JSON document.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store writing to the configured collection path.
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            path: config.collection_path(),
        }
    }

    /// Creates a store writing to an explicit file path.
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    fn try_load(&self) -> CabinetResult<Vec<MedicineRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(CabinetError::FileRead)?;
        serde_json::from_str(&raw).map_err(CabinetError::Deserialization)
    }

    fn try_save(&self, records: &[MedicineRecord]) -> CabinetResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(CabinetError::StorageDirCreation)?;
            }
        }
        let raw = serde_json::to_string_pretty(records).map_err(CabinetError::Serialization)?;
        fs::write(&self.path, raw).map_err(CabinetError::FileWrite)
    }
}

impl CollectionStore for JsonFileStore {
    fn load(&self) -> Vec<MedicineRecord> {
        match self.try_load() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    "failed to load collection from {}: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn save(&self, records: &[MedicineRecord]) {
        if let Err(e) = self.try_save(records) {
            tracing::warn!("failed to save collection to {}: {}", self.path.display(), e);
        }
    }
}

/// In-memory store implementing the same contract.
///
/// Used as the test double for the reconciler and usable by embedders that
/// manage persistence themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<MedicineRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given records.
    pub fn with_records(records: Vec<MedicineRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Returns a snapshot of the stored records.
    pub fn records(&self) -> Vec<MedicineRecord> {
        self.records.lock().expect("store mutex poisoned").clone()
    }
}

impl CollectionStore for MemoryStore {
    fn load(&self) -> Vec<MedicineRecord> {
        self.records()
    }

    fn save(&self, records: &[MedicineRecord]) {
        *self.records.lock().expect("store mutex poisoned") = records.to_vec();
    }
}

#[cfg(test)]
mod store_tests {
    use super::*;
    use apteczka_types::RecordId;
    use chrono::Utc;

    fn sample_record(name: &str) -> MedicineRecord {
        MedicineRecord {
            id: RecordId::generate(),
            name: Some(name.to_string()),
            description: "test".into(),
            indications: vec![],
            tags: vec![],
            user_label_ids: vec![],
            note: None,
            expiry_date: None,
            date_added: Utc::now(),
        }
    }

    #[test]
    fn load_returns_empty_for_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonFileStore::at_path(dir.path().join("apteczka.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn load_returns_empty_for_unparseable_content() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("apteczka.json");
        fs::write(&path, "not json at all {").expect("write garbage");
        let store = JsonFileStore::at_path(path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonFileStore::at_path(dir.path().join("apteczka.json"));
        let records = vec![sample_record("Apap"), sample_record("Ibuprom")];
        store.save(&records);
        assert_eq!(store.load(), records);
    }

    #[test]
    fn save_creates_missing_data_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonFileStore::at_path(dir.path().join("nested").join("apteczka.json"));
        store.save(&[sample_record("Apap")]);
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn memory_store_honours_the_contract() {
        let store = MemoryStore::new();
        assert!(store.load().is_empty());
        let records = vec![sample_record("Apap")];
        store.save(&records);
        assert_eq!(store.load(), records);
    }
}
