//! # Apteczka core
//!
//! Core import and tag logic for the apteczka medicine-cabinet tracker.
//!
//! This crate contains pure data operations over an in-memory collection
//! loaded from and saved back to a flat key-value store:
//! - The medicine record data model and its JSON wire shapes
//! - Tag normalization and implication expansion applied during ingestion
//! - Import reconciliation: collision detection and per-name duplicate
//!   resolution (replace / add alongside / skip) for fresh imports and
//!   backup restores
//! - The collection store contract with file-backed and in-memory
//!   implementations
//!
//! **No interface concerns**: the CLI, any UI, and the calls to the external
//! OCR/lookup service belong in outer crates. The core is single-threaded
//! and synchronous; it assumes one active caller performing one import at a
//! time.

pub mod config;
pub mod constants;
pub mod error;
pub mod payload;
pub mod reconcile;
pub mod record;
pub mod store;
pub mod tags;
pub mod vocabulary;

pub use config::CoreConfig;
pub use error::{CabinetError, CabinetResult};
pub use payload::{ImportPayload, PayloadFormat, ValidationIssue};
pub use reconcile::{
    find_duplicates, remove_record, DuplicateAction, DuplicateDecisions, DuplicateMatch,
    ImportOutcome, ImportService,
};
pub use record::{BackupDraft, MedicineDraft, MedicineRecord};
pub use store::{CollectionStore, JsonFileStore, MemoryStore};
