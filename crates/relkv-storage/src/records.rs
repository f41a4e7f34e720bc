//! Typed record persistence.
//!
//! Values are JSON-encoded and stored under `{kind}:{id}`. The store owns
//! its id allocator, so independent stores (e.g. one per test) never share
//! counters.

use std::ops::ControlFlow;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use relkv_types::{Category, Company, Entity, EntityKind, Order, Product, RecordId, User};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::allocator::IdAllocator;
use crate::db::Storage;
use crate::error::StorageError;
use crate::keys::{display_key, record_key, record_prefix};

/// Generic record store over a shared [`Storage`] handle.
pub struct RecordStore {
    storage: Arc<Storage>,
    ids: IdAllocator,
}

impl RecordStore {
    /// Open a database at `path` and build a store over it.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Self::new(Arc::new(Storage::open(path)?))
    }

    /// Build a store over an already-open database, seeding id counters.
    pub fn new(storage: Arc<Storage>) -> Result<Self, StorageError> {
        let ids = IdAllocator::load(storage.clone())?;
        Ok(Self { storage, ids })
    }

    /// Get underlying storage.
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Get the id allocator.
    pub fn allocator(&self) -> &IdAllocator {
        &self.ids
    }

    // ===== Generic operations =====

    /// Serialize `value` and write it under `{kind}:{id}`.
    ///
    /// Fails with `Serialization` if the encoded value would not decode back
    /// into `T`, e.g. a non-finite float.
    pub fn put<T: Serialize + DeserializeOwned>(
        &self,
        kind: EntityKind,
        id: RecordId,
        value: &T,
    ) -> Result<(), StorageError> {
        let key = record_key(kind, id);
        let bytes = encode(&key, value)?;
        self.storage.put(&key, &bytes)?;
        debug!(key = %display_key(&key), "Stored record");
        Ok(())
    }

    /// Read and decode the record at `{kind}:{id}`.
    pub fn get<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        id: RecordId,
    ) -> Result<T, StorageError> {
        self.find(kind, id)?
            .ok_or_else(|| StorageError::NotFound(display_key(&record_key(kind, id))))
    }

    /// Like [`RecordStore::get`], but an absent record is `None`.
    pub fn find<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        id: RecordId,
    ) -> Result<Option<T>, StorageError> {
        let key = record_key(kind, id);
        match self.storage.get(&key)? {
            Some(bytes) => Ok(Some(decode(&key, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Whether a record exists at `{kind}:{id}`.
    pub fn exists(&self, kind: EntityKind, id: RecordId) -> Result<bool, StorageError> {
        Ok(self.storage.get(&record_key(kind, id))?.is_some())
    }

    /// Decode every record of `kind`, in key order.
    ///
    /// Key order is byte order over unpadded decimal ids, so id 10 comes
    /// before id 2. An empty keyspace yields an empty vec.
    pub fn list<T: DeserializeOwned>(&self, kind: EntityKind) -> Result<Vec<T>, StorageError> {
        let mut records = Vec::new();
        self.storage.scan_prefix(&record_prefix(kind), |key, value| {
            records.push(decode(key, value)?);
            Ok(ControlFlow::Continue(()))
        })?;
        debug!(kind = %kind, count = records.len(), "Listed records");
        Ok(records)
    }

    /// Remove the record at `{kind}:{id}`. Returns whether it existed.
    ///
    /// The id is never reissued.
    pub fn delete(&self, kind: EntityKind, id: RecordId) -> Result<bool, StorageError> {
        let key = record_key(kind, id);
        let existed = self.storage.delete_if_present(&key)?;
        debug!(key = %display_key(&key), existed, "Deleted record");
        Ok(existed)
    }

    // ===== Typed operations =====

    /// Validate, assign a fresh id, stamp the creation time, and persist.
    ///
    /// A record that fails validation does not consume an id.
    pub fn insert<T: Entity>(&self, mut record: T) -> Result<T, StorageError> {
        record.validate().map_err(StorageError::InvalidInput)?;
        let id = self.ids.next_id(T::KIND)?;
        record.set_id(id);
        record.stamp_created(Utc::now());
        self.put(T::KIND, id, &record)?;
        Ok(record)
    }

    /// Rewrite an existing record in full. Fails with `NotFound` if absent.
    pub fn replace<T: Entity>(&self, record: &T) -> Result<(), StorageError> {
        record.validate().map_err(StorageError::InvalidInput)?;
        let key = record_key(T::KIND, record.id());
        let bytes = encode(&key, record)?;
        if !self.storage.put_if_present(&key, &bytes)? {
            return Err(StorageError::NotFound(display_key(&key)));
        }
        debug!(key = %display_key(&key), "Replaced record");
        Ok(())
    }

    /// Typed [`RecordStore::get`].
    pub fn fetch<T: Entity>(&self, id: RecordId) -> Result<T, StorageError> {
        self.get(T::KIND, id)
    }

    /// Typed [`RecordStore::find`].
    pub fn lookup<T: Entity>(&self, id: RecordId) -> Result<Option<T>, StorageError> {
        self.find(T::KIND, id)
    }

    /// Typed [`RecordStore::list`].
    pub fn fetch_all<T: Entity>(&self) -> Result<Vec<T>, StorageError> {
        self.list(T::KIND)
    }

    // ===== Entity-specific operations =====

    pub fn create_user(&self, user: User) -> Result<User, StorageError> {
        self.insert(user)
    }

    pub fn create_company(&self, company: Company) -> Result<Company, StorageError> {
        self.insert(company)
    }

    /// Persist a new product. Price must be finite and non-negative.
    pub fn create_product(&self, product: Product) -> Result<Product, StorageError> {
        self.insert(product)
    }

    pub fn create_category(&self, category: Category) -> Result<Category, StorageError> {
        self.insert(category)
    }

    /// Persist a new order. Quantity must be positive and amount finite.
    pub fn create_order(&self, order: Order) -> Result<Order, StorageError> {
        self.insert(order)
    }

    pub fn get_user(&self, id: RecordId) -> Result<User, StorageError> {
        self.fetch(id)
    }

    pub fn get_company(&self, id: RecordId) -> Result<Company, StorageError> {
        self.fetch(id)
    }

    pub fn get_product(&self, id: RecordId) -> Result<Product, StorageError> {
        self.fetch(id)
    }

    pub fn get_category(&self, id: RecordId) -> Result<Category, StorageError> {
        self.fetch(id)
    }

    pub fn get_order(&self, id: RecordId) -> Result<Order, StorageError> {
        self.fetch(id)
    }

    pub fn list_users(&self) -> Result<Vec<User>, StorageError> {
        self.fetch_all()
    }

    pub fn list_companies(&self) -> Result<Vec<Company>, StorageError> {
        self.fetch_all()
    }

    pub fn list_products(&self) -> Result<Vec<Product>, StorageError> {
        self.fetch_all()
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        self.fetch_all()
    }

    pub fn list_orders(&self) -> Result<Vec<Order>, StorageError> {
        self.fetch_all()
    }

    /// Rewrite a user record. Users are the only kind updated in place.
    pub fn update_user(&self, user: &User) -> Result<(), StorageError> {
        self.replace(user)
    }

    pub fn delete_user(&self, id: RecordId) -> Result<bool, StorageError> {
        self.delete(EntityKind::Users, id)
    }

    pub fn delete_company(&self, id: RecordId) -> Result<bool, StorageError> {
        self.delete(EntityKind::Companies, id)
    }

    pub fn delete_product(&self, id: RecordId) -> Result<bool, StorageError> {
        self.delete(EntityKind::Products, id)
    }

    pub fn delete_category(&self, id: RecordId) -> Result<bool, StorageError> {
        self.delete(EntityKind::Categories, id)
    }

    pub fn delete_order(&self, id: RecordId) -> Result<bool, StorageError> {
        self.delete(EntityKind::Orders, id)
    }
}

// serde_json writes NaN and infinities as `null`, which no f64 field decodes.
fn encode<T>(key: &[u8], value: &T) -> Result<Vec<u8>, StorageError>
where
    T: Serialize + DeserializeOwned,
{
    let serialization_err = |e: serde_json::Error| StorageError::Serialization {
        key: display_key(key),
        message: e.to_string(),
    };

    let bytes = serde_json::to_vec(value).map_err(serialization_err)?;
    serde_json::from_slice::<T>(&bytes).map_err(serialization_err)?;
    Ok(bytes)
}

fn decode<T: DeserializeOwned>(key: &[u8], bytes: &[u8]) -> Result<T, StorageError> {
    serde_json::from_slice(bytes).map_err(|e| StorageError::Deserialization {
        key: display_key(key),
        message: e.to_string(),
    })
}
