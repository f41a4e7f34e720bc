//! Read-only inspection of the raw keyspace.
//!
//! Used to verify the key layout of an existing database: how many keys sit
//! under each prefix, and what a prefix actually contains.

use std::collections::BTreeMap;
use std::ops::ControlFlow;

use relkv_types::{EntityKind, RecordId};
use serde::Serialize;

use crate::db::Storage;
use crate::error::StorageError;
use crate::keys::{display_key, parse_record_key};

/// Bucket for keys with neither `:` nor `/` in them.
pub const NO_PREFIX: &str = "no_prefix";

/// Key counts per prefix, with the first few keys of each as samples.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PrefixSummary {
    pub counts: BTreeMap<String, u64>,
    pub samples: BTreeMap<String, Vec<String>>,
    /// Largest id among well-formed record keys, per kind
    pub highest_ids: BTreeMap<EntityKind, RecordId>,
}

impl PrefixSummary {
    /// Total keys across all prefixes.
    pub fn total_keys(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// A raw entry with its value decoded as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

/// Prefix of a key: text before the first `:`, else before the first `/`.
pub fn key_prefix(key: &str) -> &str {
    if let Some(idx) = key.find(':') {
        &key[..idx]
    } else if let Some(idx) = key.find('/') {
        &key[..idx]
    } else {
        NO_PREFIX
    }
}

/// Count every key by prefix, keeping up to `sample_size` keys per prefix.
pub fn summarize_prefixes(
    storage: &Storage,
    sample_size: usize,
) -> Result<PrefixSummary, StorageError> {
    let mut summary = PrefixSummary::default();

    storage.scan_all(|raw_key, _| {
        if let Ok((kind, id)) = parse_record_key(raw_key) {
            let highest = summary.highest_ids.entry(kind).or_insert(id);
            *highest = (*highest).max(id);
        }

        let key = display_key(raw_key);
        let prefix = key_prefix(&key).to_string();

        let count = summary.counts.entry(prefix.clone()).or_insert(0);
        *count += 1;

        let samples = summary.samples.entry(prefix).or_default();
        if samples.len() < sample_size {
            samples.push(key);
        }
        Ok(ControlFlow::Continue(()))
    })?;

    Ok(summary)
}

/// Every entry whose key starts with `prefix`, in key order.
pub fn dump_prefix(storage: &Storage, prefix: &str) -> Result<Vec<KeyValue>, StorageError> {
    let mut entries = Vec::new();
    storage.scan_prefix(prefix.as_bytes(), |key, value| {
        entries.push(KeyValue {
            key: display_key(key),
            value: String::from_utf8_lossy(value).into_owned(),
        });
        Ok(ControlFlow::Continue(()))
    })?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_key_prefix() {
        assert_eq!(key_prefix("users:1"), "users");
        assert_eq!(key_prefix("counter:users"), "counter");
        assert_eq!(key_prefix("blobs/abc"), "blobs");
        assert_eq!(key_prefix("a/b:c"), "a/b");
        assert_eq!(key_prefix("plain"), NO_PREFIX);
    }

    #[test]
    fn test_summarize_prefixes() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(temp_dir.path()).unwrap();

        for i in 1..=5 {
            storage.put(format!("users:{}", i).as_bytes(), b"{}").unwrap();
        }
        storage.put(b"counter:users", b"5").unwrap();
        storage.put(b"orphan", b"x").unwrap();

        let summary = summarize_prefixes(&storage, 3).unwrap();
        assert_eq!(summary.counts["users"], 5);
        assert_eq!(summary.counts["counter"], 1);
        assert_eq!(summary.counts[NO_PREFIX], 1);
        assert_eq!(summary.total_keys(), 7);
        assert_eq!(
            summary.samples["users"],
            vec!["users:1", "users:2", "users:3"]
        );
        // Numeric max, not the last key in scan order
        assert_eq!(summary.highest_ids[&EntityKind::Users], 5);
        assert_eq!(summary.highest_ids.len(), 1);
    }

    #[test]
    fn test_highest_ids_ignore_malformed_keys() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(temp_dir.path()).unwrap();

        for id in [2u64, 10, 9] {
            storage.put(format!("orders:{}", id).as_bytes(), b"{}").unwrap();
        }
        storage.put(b"orders:draft", b"{}").unwrap();
        storage.put(b"invoices:99", b"{}").unwrap();

        let summary = summarize_prefixes(&storage, 3).unwrap();
        assert_eq!(summary.highest_ids[&EntityKind::Orders], 10);
        assert_eq!(summary.highest_ids.len(), 1);
        assert_eq!(summary.counts["orders"], 4);
    }

    #[test]
    fn test_dump_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(temp_dir.path()).unwrap();

        storage.put(b"categories:1", br#"{"id":1,"name":"Books"}"#).unwrap();
        storage.put(b"companies:1", b"{}").unwrap();

        let entries = dump_prefix(&storage, "categories").unwrap();
        assert_eq!(
            entries,
            vec![KeyValue {
                key: "categories:1".to_string(),
                value: r#"{"id":1,"name":"Books"}"#.to_string(),
            }]
        );

        assert!(dump_prefix(&storage, "products:").unwrap().is_empty());
    }
}
