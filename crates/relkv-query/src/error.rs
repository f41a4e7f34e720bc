//! Query error types.

use thiserror::Error;

/// Errors that can occur while composing a view.
///
/// Missing related records inside a join are not errors; they drop the row.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Storage, encoding, or decoding failure
    #[error("Storage error: {0}")]
    Storage(#[from] relkv_storage::StorageError),

    /// The root record of a filtered query does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}
