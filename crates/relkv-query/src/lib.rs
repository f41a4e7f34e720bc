//! # relkv-query
//!
//! Read-side relational views over the relkv record store.
//!
//! Every operation lists base records with a prefix scan, resolves references
//! with point lookups, and aggregates in memory. Nothing here writes.
//!
//! ## Join policy
//!
//! - A reference to a missing record drops that result row (tolerant join)
//! - Storage and decode failures abort the whole query
//! - A missing root record in a filtered query is a hard `NotFound`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use relkv_query::QueryEngine;
//! use relkv_storage::RecordStore;
//!
//! let store = Arc::new(RecordStore::open(path)?);
//! let engine = QueryEngine::new(store);
//! for row in engine.users_with_companies()? {
//!     println!("{} works at {}", row.user.name, row.company.name);
//! }
//! ```

pub mod aggregates;
pub mod engine;
pub mod error;
pub mod joins;
pub mod ranking;

pub use engine::QueryEngine;
pub use error::QueryError;
pub use ranking::SalesByCategory;
