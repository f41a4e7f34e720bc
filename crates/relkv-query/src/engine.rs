//! Query engine handle.
//!
//! The view operations themselves live in `joins`, `aggregates`, and
//! `ranking`; this module holds the shared store handle and lookup helper.

use std::sync::Arc;

use relkv_storage::RecordStore;
use relkv_types::{Entity, RecordId};

use crate::error::QueryError;

/// Composes record store reads into denormalized views.
pub struct QueryEngine {
    store: Arc<RecordStore>,
}

impl QueryEngine {
    /// Create a new engine over a shared record store.
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// Get underlying record store.
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Resolve a reference. `None` means the referenced record is absent.
    pub(crate) fn resolve<T: Entity>(&self, id: RecordId) -> Result<Option<T>, QueryError> {
        Ok(self.store.lookup::<T>(id)?)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use relkv_storage::{seed_demo_data, RecordStore};
    use tempfile::TempDir;

    use super::QueryEngine;

    pub fn create_test_engine() -> (QueryEngine, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(RecordStore::open(temp_dir.path()).unwrap());
        (QueryEngine::new(store), temp_dir)
    }

    /// Demo dataset: 3 categories, 3 companies, 3 users, 3 products, 4 orders.
    pub fn seed(engine: &QueryEngine) {
        seed_demo_data(engine.store()).unwrap();
    }
}
