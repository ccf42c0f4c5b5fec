//! Shared constants for the apteczka core.

/// File name of the collection blob inside the data directory.
pub const COLLECTION_FILE_NAME: &str = "apteczka.json";

/// Default data directory name used when the caller supplies none.
pub const DEFAULT_DATA_DIR_NAME: &str = "apteczka_data";

/// Envelope key carrying medicine records in import and backup payloads.
pub const PAYLOAD_RECORDS_KEY: &str = "leki";
