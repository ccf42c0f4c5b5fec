//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! core services. Core code never reads environment variables itself; the
//! binary resolves the data directory (flag, environment, default) and
//! constructs a `CoreConfig` from the result.

use crate::constants::COLLECTION_FILE_NAME;
use crate::error::{CabinetError, CabinetResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The data directory does not need to exist yet (the store creates it
    /// on first save), but a path pointing at an existing non-directory is
    /// rejected.
    pub fn new(data_dir: PathBuf) -> CabinetResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(CabinetError::InvalidInput(
                "data directory cannot be empty".into(),
            ));
        }
        if data_dir.exists() && !data_dir.is_dir() {
            return Err(CabinetError::InvalidInput(format!(
                "data directory is not a directory: {}",
                data_dir.display()
            )));
        }
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the collection blob inside the data directory.
    pub fn collection_path(&self) -> PathBuf {
        self.data_dir.join(COLLECTION_FILE_NAME)
    }
}
