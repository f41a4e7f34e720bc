//! RocksDB wrapper for relkv storage.
//!
//! Provides:
//! - Database open/close, read-write or read-only
//! - Atomic single-key get/put/delete
//! - Read-write transactions for conditional whole-record rewrites
//! - Snapshot-consistent prefix scans in raw key order

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use rocksdb::{Direction, IteratorMode, Options, TransactionDB, TransactionDBOptions, DB};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::keys::display_key;

type ScanItem = Result<(Box<[u8]>, Box<[u8]>), rocksdb::Error>;

enum Handle {
    ReadWrite(TransactionDB),
    /// Opened without the lock file; RocksDB rejects every write.
    ReadOnly(DB),
}

/// Key-value store handle shared by the allocator and the record store.
///
/// The underlying database is closed when the last owner drops it.
pub struct Storage {
    db: Handle,
    path: PathBuf,
}

impl Storage {
    /// Open storage at the given path, creating if necessary
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening storage at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.set_max_background_jobs(4);

        let txn_db_opts = TransactionDBOptions::default();
        let db = TransactionDB::open(&db_opts, &txn_db_opts, path).map_err(StorageError::Open)?;

        Ok(Self {
            db: Handle::ReadWrite(db),
            path: path.to_path_buf(),
        })
    }

    /// Open an existing database for reading only.
    ///
    /// Fails if no database exists at `path`. Nothing is written to the
    /// directory, and a process holding the database open is not disturbed.
    pub fn open_read_only(path: &Path) -> Result<Self, StorageError> {
        info!("Opening storage read-only at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(false);

        let db = DB::open_for_read_only(&db_opts, path, false).map_err(StorageError::Open)?;

        Ok(Self {
            db: Handle::ReadOnly(db),
            path: path.to_path_buf(),
        })
    }

    /// Directory the database lives in.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this handle was opened with [`Storage::open_read_only`].
    pub fn is_read_only(&self) -> bool {
        matches!(self.db, Handle::ReadOnly(_))
    }

    /// Get the value stored at `key`.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let result = match &self.db {
            Handle::ReadWrite(db) => db.get(key),
            Handle::ReadOnly(db) => db.get(key),
        };
        result.map_err(|source| StorageError::Read {
            key: display_key(key),
            source,
        })
    }

    /// Write `value` at `key`, replacing any previous value.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let result = match &self.db {
            Handle::ReadWrite(db) => db.put(key, value),
            Handle::ReadOnly(db) => db.put(key, value),
        };
        result.map_err(|source| StorageError::Write {
            key: display_key(key),
            source,
        })
    }

    /// Remove `key`. Deleting an absent key is not an error.
    pub fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        let result = match &self.db {
            Handle::ReadWrite(db) => db.delete(key),
            Handle::ReadOnly(db) => db.delete(key),
        };
        result.map_err(|source| StorageError::Write {
            key: display_key(key),
            source,
        })
    }

    /// Overwrite `key` only if it already exists.
    ///
    /// Runs as one read-write transaction holding a lock on the key, so a
    /// concurrent delete cannot be undone by this write. Returns false and
    /// writes nothing when the key is absent.
    pub fn put_if_present(&self, key: &[u8], value: &[u8]) -> Result<bool, StorageError> {
        let db = self.transactional(key)?;
        let write_err = |source| StorageError::Write {
            key: display_key(key),
            source,
        };

        let txn = db.transaction();
        if txn.get_for_update(key, true).map_err(write_err)?.is_none() {
            return Ok(false);
        }
        txn.put(key, value).map_err(write_err)?;
        txn.commit().map_err(write_err)?;
        Ok(true)
    }

    /// Remove `key`, reporting whether it existed.
    pub fn delete_if_present(&self, key: &[u8]) -> Result<bool, StorageError> {
        let db = self.transactional(key)?;
        let write_err = |source| StorageError::Write {
            key: display_key(key),
            source,
        };

        let txn = db.transaction();
        if txn.get_for_update(key, true).map_err(write_err)?.is_none() {
            return Ok(false);
        }
        txn.delete(key).map_err(write_err)?;
        txn.commit().map_err(write_err)?;
        Ok(true)
    }

    /// Visit every entry whose key starts with `prefix`, in raw key order.
    ///
    /// The scan reads from a single snapshot, so concurrent writes are not
    /// observed mid-scan. The visitor may stop the scan early by returning
    /// `ControlFlow::Break`.
    pub fn scan_prefix<F>(&self, prefix: &[u8], mut visit: F) -> Result<(), StorageError>
    where
        F: FnMut(&[u8], &[u8]) -> Result<ControlFlow<()>, StorageError>,
    {
        let mode = IteratorMode::From(prefix, Direction::Forward);
        match &self.db {
            Handle::ReadWrite(db) => {
                let snapshot = db.snapshot();
                visit_prefix(snapshot.iterator(mode), prefix, &mut visit)
            }
            Handle::ReadOnly(db) => {
                let snapshot = db.snapshot();
                visit_prefix(snapshot.iterator(mode), prefix, &mut visit)
            }
        }
    }

    /// Visit every entry in the database, in raw key order.
    pub fn scan_all<F>(&self, visit: F) -> Result<(), StorageError>
    where
        F: FnMut(&[u8], &[u8]) -> Result<ControlFlow<()>, StorageError>,
    {
        self.scan_prefix(b"", visit)
    }

    fn transactional(&self, key: &[u8]) -> Result<&TransactionDB, StorageError> {
        match &self.db {
            Handle::ReadWrite(db) => Ok(db),
            Handle::ReadOnly(_) => Err(StorageError::ReadOnly(display_key(key))),
        }
    }
}

fn visit_prefix<I, F>(iter: I, prefix: &[u8], visit: &mut F) -> Result<(), StorageError>
where
    I: Iterator<Item = ScanItem>,
    F: FnMut(&[u8], &[u8]) -> Result<ControlFlow<()>, StorageError>,
{
    let mut visited = 0usize;
    for item in iter {
        let (key, value) = item.map_err(|source| StorageError::Scan {
            prefix: display_key(prefix),
            source,
        })?;
        // Stop if we've passed the prefix
        if !key.starts_with(prefix) {
            break;
        }
        visited += 1;
        if visit(&key, &value)?.is_break() {
            debug!(prefix = %display_key(prefix), visited, "Scan stopped by visitor");
            return Ok(());
        }
    }

    debug!(prefix = %display_key(prefix), visited, "Scan complete");
    Ok(())
}
