//! Raw record persistence
//!
//! The store is the harvester's durable memory: one record per item key in
//! an append-only namespace. Scheduling only ever asks "is this key already
//! stored?", so a crash-interrupted run resumes by re-discovering sets and
//! skipping stored keys. Each write targets a distinct key, so writers need
//! no coordination beyond an atomic publish of the finished record.

mod fs;

pub use fs::FsRecordStore;

use crate::record::Record;
use thiserror::Error;

/// Errors that can occur during record store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid record key {0:?}")]
    InvalidKey(String),

    #[error("record {key} is unreadable: {message}")]
    Corrupt { key: String, message: String },

    #[error("failed to serialize record {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for record store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable key-to-record storage
///
/// Implementations must support concurrent writers to disjoint keys.
pub trait RecordStore: Send + Sync {
    /// Returns whether a record is already stored for the key
    fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Durably writes the record for a key
    fn write(&self, key: &str, record: &Record) -> StoreResult<()>;

    /// Reads the record stored for a key
    fn read(&self, key: &str) -> StoreResult<Record>;

    /// Lists every stored key
    fn list(&self) -> StoreResult<Vec<String>>;
}
