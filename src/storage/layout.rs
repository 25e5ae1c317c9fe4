use std::path::PathBuf;
use std::fs;
use crate::core::error::{Error, ErrorKind, Result};

/// Directory structure for collection files
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub base_dir: PathBuf,      // Location holding every collection blob
}

impl StorageLayout {
    /// Prepare `base_dir`, creating it and any missing parents
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir).map_err(|e| {
            Error::new(
                ErrorKind::Database,
                format!("Unable to create folder {}: {}", base_dir.display(), e),
            )
        })?;

        Ok(StorageLayout { base_dir })
    }

    pub fn collection_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", name))
    }

    pub fn lock_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!(".{}.lock", name))
    }
}
