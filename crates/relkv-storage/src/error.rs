//! Storage layer error types.

use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database could not be opened
    #[error("Failed to open RocksDB: {0}")]
    Open(#[source] rocksdb::Error),

    /// Point read failed
    #[error("Read failed for key {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: rocksdb::Error,
    },

    /// Write, delete, or transaction commit failed
    #[error("Write failed for key {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: rocksdb::Error,
    },

    /// Write attempted through a read-only handle
    #[error("Storage is read-only, cannot write key {0}")]
    ReadOnly(String),

    /// Prefix iteration failed
    #[error("Scan failed for prefix {prefix}: {source}")]
    Scan {
        prefix: String,
        #[source]
        source: rocksdb::Error,
    },

    /// Key encoding/decoding error
    #[error("Key error: {0}")]
    Key(String),

    /// Value could not be encoded
    #[error("Serialization error for key {key}: {message}")]
    Serialization { key: String, message: String },

    /// Stored bytes could not be decoded into the requested shape
    #[error("Deserialization error for key {key}: {message}")]
    Deserialization { key: String, message: String },

    /// No record at the requested key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected before touching the store
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StorageError {
    /// True when the error only signals an absent record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}
