//! Key encoding and decoding for the storage layer.
//!
//! Record key format: `{kind}:{id}`
//! - kind: entity keyspace name (users, companies, orders, products, categories)
//! - id: decimal identifier, NOT zero-padded
//!
//! Counter key format: `counter:{kind}`
//!
//! Ids are unpadded to stay compatible with existing data, so a prefix scan
//! returns `users:10` before `users:2`. Scan order is raw byte order.

use relkv_types::{EntityKind, RecordId};

use crate::error::StorageError;

/// Reserved namespace for allocator counters.
pub const COUNTER_NAMESPACE: &str = "counter";

/// Encode a record key: "{kind}:{id}"
pub fn record_key(kind: EntityKind, id: RecordId) -> Vec<u8> {
    format!("{}:{}", kind, id).into_bytes()
}

/// Prefix shared by every record of one kind: "{kind}:"
pub fn record_prefix(kind: EntityKind) -> Vec<u8> {
    format!("{}:", kind).into_bytes()
}

/// Encode the counter key for a kind: "counter:{kind}"
pub fn counter_key(kind: EntityKind) -> Vec<u8> {
    format!("{}:{}", COUNTER_NAMESPACE, kind).into_bytes()
}

/// Decode a record key back into its kind and id.
pub fn parse_record_key(bytes: &[u8]) -> Result<(EntityKind, RecordId), StorageError> {
    let s = std::str::from_utf8(bytes)
        .map_err(|e| StorageError::Key(format!("Invalid UTF-8: {}", e)))?;

    let (kind, id) = s
        .split_once(':')
        .ok_or_else(|| StorageError::Key(format!("Invalid record key format: {}", s)))?;

    let kind: EntityKind = kind
        .parse()
        .map_err(|e| StorageError::Key(format!("{} in key {}", e, s)))?;
    let id: RecordId = id
        .parse()
        .map_err(|e| StorageError::Key(format!("Invalid id in key {}: {}", s, e)))?;

    Ok((kind, id))
}

/// Lossy, printable form of a raw key for logs and errors.
pub fn display_key(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
