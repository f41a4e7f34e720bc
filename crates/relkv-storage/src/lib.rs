//! Storage layer for the relkv relational layer.
//!
//! Provides RocksDB-backed storage with:
//! - Prefixed keys per entity kind (`users:1`, `orders:42`)
//! - Per-kind id counters persisted under `counter:{kind}`
//! - Generic typed get/put/list over JSON-encoded records
//! - Snapshot-consistent prefix scans
//! - Raw keyspace inspection
//! - A small demo dataset

pub mod allocator;
pub mod db;
pub mod demo;
pub mod error;
pub mod inspect;
pub mod keys;
pub mod records;

pub use allocator::IdAllocator;
pub use db::Storage;
pub use demo::{seed_demo_data, SeedCounts};
pub use error::StorageError;
pub use inspect::{dump_prefix, summarize_prefixes, KeyValue, PrefixSummary};
pub use records::RecordStore;
