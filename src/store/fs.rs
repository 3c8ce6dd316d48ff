//! Filesystem record store
//!
//! One JSON file per record under a flat directory, named `<key>.json`.
//! Writes go through a temp file in the same directory and are published
//! with a rename, so readers and the exists-check never observe a partial
//! record.

use crate::record::Record;
use crate::store::{RecordStore, StoreError, StoreResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const RECORD_EXT: &str = "json";

/// Record store backed by a directory of JSON files
pub struct FsRecordStore {
    root: PathBuf,
}

impl FsRecordStore {
    /// Opens the store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the directory holding the record files
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{RECORD_EXT}")))
    }
}

/// Keys become file names, so only plain identifier characters are allowed
fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

impl RecordStore for FsRecordStore {
    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.record_path(key)?.try_exists()?)
    }

    fn write(&self, key: &str, record: &Record) -> StoreResult<()> {
        let path = self.record_path(key)?;
        let payload = serde_json::to_vec_pretty(record).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&payload)?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    fn read(&self, key: &str) -> StoreResult<Record> {
        let path = self.record_path(key)?;
        let data = fs::read(path)?;
        serde_json::from_slice(&data).map_err(|e| StoreError::Corrupt {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(key) = name.strip_suffix(&format!(".{RECORD_EXT}")) {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}
