//! Entity kinds and the trait binding a record shape to its keyspace.
//!
//! Every persisted record lives under `"<kind>:<id>"`. The kind names below
//! are part of the on-disk layout and must never change.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::RelkvError;

/// Surrogate identifier assigned by the store. Never reused within a kind.
pub type RecordId = u64;

/// The fixed set of record categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Users,
    Companies,
    Orders,
    Products,
    Categories,
}

impl EntityKind {
    /// All kinds, in the order counters are seeded at startup.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Users,
        EntityKind::Companies,
        EntityKind::Orders,
        EntityKind::Products,
        EntityKind::Categories,
    ];

    /// Keyspace name used in record and counter keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Users => "users",
            EntityKind::Companies => "companies",
            EntityKind::Orders => "orders",
            EntityKind::Products => "products",
            EntityKind::Categories => "categories",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = RelkvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RelkvError::UnknownKind(s.to_string()))
    }
}

/// A record shape persisted under a single entity kind.
///
/// The store allocates the id on insert; `stamp_created` is a no-op for
/// shapes without a creation timestamp.
pub trait Entity: Serialize + DeserializeOwned {
    /// Keyspace this record shape is stored under.
    const KIND: EntityKind;

    /// Current identifier (0 until assigned).
    fn id(&self) -> RecordId;

    /// Assign the store-issued identifier.
    fn set_id(&mut self, id: RecordId);

    /// Record the creation time, for shapes that carry one.
    fn stamp_created(&mut self, _at: DateTime<Utc>) {}

    /// Check field constraints before the record is written.
    ///
    /// Non-finite floats must be rejected here: JSON has no encoding for
    /// them and they would be stored as `null`.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}
