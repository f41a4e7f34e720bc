//! Surrogate id allocation.
//!
//! One counter per entity kind, mirrored under `counter:{kind}` as a JSON
//! integer. All kinds share a single mutex, so increment-and-persist is one
//! critical section per allocator instance.
//!
//! If persisting fails after the in-memory increment, the increment is kept:
//! the issued id is burned and the persisted counter lags until the next
//! successful allocation. Callers must treat the error as fatal to the create
//! that asked for the id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use relkv_types::{EntityKind, RecordId};
use tracing::{debug, warn};

use crate::db::Storage;
use crate::error::StorageError;
use crate::keys::{counter_key, display_key};

/// Per-kind monotonically increasing id source.
pub struct IdAllocator {
    storage: Arc<Storage>,
    counters: Mutex<HashMap<EntityKind, RecordId>>,
}

impl IdAllocator {
    /// Seed every kind's counter from storage. Absent counters start at 0.
    pub fn load(storage: Arc<Storage>) -> Result<Self, StorageError> {
        let mut counters = HashMap::with_capacity(EntityKind::ALL.len());

        for kind in EntityKind::ALL {
            let key = counter_key(kind);
            let value = match storage.get(&key)? {
                Some(bytes) => serde_json::from_slice::<RecordId>(&bytes).map_err(|e| {
                    StorageError::Deserialization {
                        key: display_key(&key),
                        message: e.to_string(),
                    }
                })?,
                None => 0,
            };
            debug!(kind = %kind, counter = value, "Seeded id counter");
            counters.insert(kind, value);
        }

        Ok(Self {
            storage,
            counters: Mutex::new(counters),
        })
    }

    /// Issue the next id for `kind` and persist the new counter value.
    pub fn next_id(&self, kind: EntityKind) -> Result<RecordId, StorageError> {
        let mut counters = self.lock();
        let counter = counters.entry(kind).or_insert(0);
        *counter += 1;
        let id = *counter;

        let key = counter_key(kind);
        let bytes = serde_json::to_vec(&id).map_err(|e| StorageError::Serialization {
            key: display_key(&key),
            message: e.to_string(),
        })?;

        if let Err(e) = self.storage.put(&key, &bytes) {
            warn!(kind = %kind, id, error = %e, "Failed to persist id counter");
            return Err(e);
        }

        debug!(kind = %kind, id, "Allocated id");
        Ok(id)
    }

    /// Last id issued for `kind` (0 if none).
    pub fn current(&self, kind: EntityKind) -> RecordId {
        self.lock().get(&kind).copied().unwrap_or(0)
    }

    // A panic while holding the lock cannot leave a counter half-updated,
    // so a poisoned map is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<EntityKind, RecordId>> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;
    use tempfile::TempDir;

    fn create_test_allocator() -> (IdAllocator, Arc<Storage>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(Storage::open(temp_dir.path()).unwrap());
        let allocator = IdAllocator::load(storage.clone()).unwrap();
        (allocator, storage, temp_dir)
    }

    #[test]
    fn test_fresh_store_starts_at_one() {
        let (allocator, _storage, _temp) = create_test_allocator();

        for kind in EntityKind::ALL {
            assert_eq!(allocator.current(kind), 0);
            assert_eq!(allocator.next_id(kind).unwrap(), 1);
        }
    }

    #[test]
    fn test_sequential_ids_strictly_increase() {
        let (allocator, _storage, _temp) = create_test_allocator();

        let ids: Vec<RecordId> = (0..25)
            .map(|_| allocator.next_id(EntityKind::Orders).unwrap())
            .collect();
        assert_eq!(ids, (1..=25).collect::<Vec<_>>());
    }

    #[test]
    fn test_kinds_are_independent() {
        let (allocator, _storage, _temp) = create_test_allocator();

        allocator.next_id(EntityKind::Users).unwrap();
        allocator.next_id(EntityKind::Users).unwrap();
        assert_eq!(allocator.next_id(EntityKind::Companies).unwrap(), 1);
        assert_eq!(allocator.current(EntityKind::Users), 2);
    }

    #[test]
    fn test_counter_is_persisted() {
        let (allocator, storage, _temp) = create_test_allocator();

        allocator.next_id(EntityKind::Products).unwrap();
        allocator.next_id(EntityKind::Products).unwrap();

        let bytes = storage.get(b"counter:products").unwrap().unwrap();
        assert_eq!(bytes, b"2".to_vec());
    }

    #[test]
    fn test_reload_continues_from_persisted_counter() {
        let temp_dir = TempDir::new().unwrap();
        {
            let storage = Arc::new(Storage::open(temp_dir.path()).unwrap());
            let allocator = IdAllocator::load(storage).unwrap();
            for _ in 0..3 {
                allocator.next_id(EntityKind::Users).unwrap();
            }
        }

        let storage = Arc::new(Storage::open(temp_dir.path()).unwrap());
        let allocator = IdAllocator::load(storage).unwrap();
        assert_eq!(allocator.current(EntityKind::Users), 3);
        assert_eq!(allocator.next_id(EntityKind::Users).unwrap(), 4);
    }

    #[test]
    fn test_corrupt_counter_fails_load() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(Storage::open(temp_dir.path()).unwrap());
        storage.put(b"counter:orders", b"not a number").unwrap();

        let result = IdAllocator::load(storage);
        assert!(matches!(
            result,
            Err(StorageError::Deserialization { .. })
        ));
    }

    #[test]
    fn test_concurrent_allocation_yields_unique_ids() {
        let (allocator, _storage, _temp) = create_test_allocator();
        let allocator = Arc::new(allocator);

        let workers = 8;
        let per_worker = 50;
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let allocator = allocator.clone();
                thread::spawn(move || {
                    (0..per_worker)
                        .map(|_| allocator.next_id(EntityKind::Users).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(all.insert(id), "duplicate id {}", id);
            }
        }

        let total = (workers * per_worker) as RecordId;
        assert_eq!(all.len() as RecordId, total);
        assert_eq!(all.iter().copied().max(), Some(total));
        assert_eq!(allocator.current(EntityKind::Users), total);
    }

    #[test]
    fn test_persist_failure_keeps_increment() {
        let temp_dir = TempDir::new().unwrap();
        {
            let storage = Arc::new(Storage::open(temp_dir.path()).unwrap());
            let allocator = IdAllocator::load(storage).unwrap();
            allocator.next_id(EntityKind::Users).unwrap();
        }

        let storage = Arc::new(Storage::open_read_only(temp_dir.path()).unwrap());
        let allocator = IdAllocator::load(storage.clone()).unwrap();
        assert_eq!(allocator.current(EntityKind::Users), 1);

        let result = allocator.next_id(EntityKind::Users);
        assert!(matches!(result, Err(StorageError::Write { .. })));

        // The in-memory counter moved on; the persisted one did not.
        assert_eq!(allocator.current(EntityKind::Users), 2);
        assert_eq!(storage.get(b"counter:users").unwrap(), Some(b"1".to_vec()));

        // Next attempt burns another id rather than reissuing 2
        assert!(allocator.next_id(EntityKind::Users).is_err());
        assert_eq!(allocator.current(EntityKind::Users), 3);
    }
}
