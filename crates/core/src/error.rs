//! Error types for the apteczka core.
//!
//! The core has little I/O of its own, so the taxonomy is narrow: storage
//! read/write failures (which the collection store swallows after logging),
//! serde failures, and rejected import payloads.

#[derive(Debug, thiserror::Error)]
pub enum CabinetError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read collection file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write collection file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize collection: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize collection: {0}")]
    Deserialization(serde_json::Error),
    #[error("payload is not valid JSON: {0}")]
    PayloadParse(serde_json::Error),
    #[error("invalid import payload: {0}")]
    InvalidPayload(String),
}

pub type CabinetResult<T> = std::result::Result<T, CabinetError>;
