// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! RocksDB-backed ordered store.
//!
//! Each namespace is a column family. Cursors are raw iterators over that
//! column family; they read an implicit snapshot and take no locks. Write
//! transactions buffer puts in a `WriteBatch` and apply it with a single
//! atomic write on commit, under a store-wide writer lock.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use rocksdb::{
    BoundColumnFamily, DBRawIteratorWithThreadMode, DBWithThreadMode, MultiThreaded, Options,
    WriteBatch, WriteOptions, DEFAULT_COLUMN_FAMILY_NAME,
};
use tracing::{debug, info};

use super::store::{validate_key, validate_value};
use super::{Cursor, OrderedStore, StorageError, WriteTransaction};

type Db = DBWithThreadMode<MultiThreaded>;

/// Durability mode for write operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurabilityMode {
    /// Writes are synced to WAL but not fsynced to disk.
    /// Durable against process crashes but not power failures.
    #[default]
    WalOnly,
    /// Every commit is fsynced to disk.
    FsyncEveryWrite,
}

/// RocksDB-backed ordered store bound to one namespace.
pub struct RocksStore {
    db: Db,
    path: PathBuf,
    namespace: String,
    write_opts: WriteOptions,
    write_lock: Mutex<()>,
    read_only: bool,
}

impl RocksStore {
    /// Opens or creates a writable store at `path`, creating `namespace` if
    /// it does not exist yet.
    pub fn open(path: &Path, namespace: &str) -> Result<Self, StorageError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        Self::open_with_options(path, namespace, opts, DurabilityMode::default(), false)
    }

    /// Opens an existing store at `path` for reading only.
    pub fn open_read_only(path: &Path, namespace: &str) -> Result<Self, StorageError> {
        Self::open_with_options(
            path,
            namespace,
            Options::default(),
            DurabilityMode::default(),
            true,
        )
    }

    /// Opens a store with custom RocksDB options.
    pub fn open_with_options(
        path: &Path,
        namespace: &str,
        mut opts: Options,
        durability: DurabilityMode,
        read_only: bool,
    ) -> Result<Self, StorageError> {
        let existing = Db::list_cf(&opts, path).unwrap_or_else(|err| {
            debug!(path = %path.display(), error = %err, "no existing column families");
            vec![DEFAULT_COLUMN_FAMILY_NAME.to_string()]
        });
        let has_namespace = existing.iter().any(|cf| cf == namespace);

        let opened = if read_only {
            if !has_namespace {
                return Err(StorageError::Unavailable(format!(
                    "namespace {namespace:?} not found in {}",
                    path.display()
                )));
            }
            Db::open_cf_for_read_only(&opts, path, &existing, false)
        } else {
            let mut cfs = existing;
            if !has_namespace {
                cfs.push(namespace.to_string());
            }
            opts.create_missing_column_families(true);
            Db::open_cf(&opts, path, &cfs)
        };
        let db = opened.map_err(|err| StorageError::Unavailable(err.to_string()))?;

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(durability == DurabilityMode::FsyncEveryWrite);

        info!(path = %path.display(), namespace, read_only, "opened rocksdb store");

        Ok(Self {
            db,
            path: path.to_path_buf(),
            namespace: namespace.to_string(),
            write_opts,
            write_lock: Mutex::new(()),
            read_only,
        })
    }

    /// Directory the store was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the namespace this store is bound to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn column_family(&self) -> Result<Arc<BoundColumnFamily<'_>>, StorageError> {
        self.db.cf_handle(&self.namespace).ok_or_else(|| {
            StorageError::Unavailable(format!("namespace {:?} is not open", self.namespace))
        })
    }
}

impl OrderedStore for RocksStore {
    type Cursor<'a> = RocksCursor<'a>;
    type Transaction<'a> = RocksTransaction<'a>;

    fn cursor(&self) -> Result<RocksCursor<'_>, StorageError> {
        let cf = self.column_family()?;
        Ok(RocksCursor {
            iter: self.db.raw_iterator_cf(&cf),
        })
    }

    fn begin(&self) -> Result<RocksTransaction<'_>, StorageError> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        let cf = self.column_family()?;
        let guard = self.write_lock.lock();
        Ok(RocksTransaction {
            store: self,
            cf,
            _guard: guard,
            batch: WriteBatch::default(),
            puts: 0,
        })
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn flush(&self) -> Result<(), StorageError> {
        if self.read_only {
            return Ok(());
        }
        let cf = self.column_family()?;
        self.db.flush_cf(&cf)?;
        Ok(())
    }
}

/// Raw-iterator cursor over one namespace.
pub struct RocksCursor<'a> {
    iter: DBRawIteratorWithThreadMode<'a, Db>,
}

impl RocksCursor<'_> {
    fn settle(&self) -> Result<bool, StorageError> {
        self.iter.status()?;
        Ok(self.iter.valid())
    }
}

impl Cursor for RocksCursor<'_> {
    fn seek_ceiling(&mut self, key: &[u8]) -> Result<bool, StorageError> {
        self.iter.seek(key);
        self.settle()
    }

    fn seek_last(&mut self) -> Result<bool, StorageError> {
        self.iter.seek_to_last();
        self.settle()
    }

    fn next(&mut self) -> Result<bool, StorageError> {
        if !self.iter.valid() {
            return Ok(false);
        }
        self.iter.next();
        self.settle()
    }

    fn prev(&mut self) -> Result<bool, StorageError> {
        if !self.iter.valid() {
            return Ok(false);
        }
        self.iter.prev();
        self.settle()
    }

    fn key(&self) -> Option<&[u8]> {
        self.iter.key()
    }

    fn value(&self) -> Option<&[u8]> {
        self.iter.value()
    }
}

/// Batched write transaction on a [`RocksStore`].
///
/// Dropping it without commit discards the batch.
pub struct RocksTransaction<'a> {
    store: &'a RocksStore,
    cf: Arc<BoundColumnFamily<'a>>,
    _guard: MutexGuard<'a, ()>,
    batch: WriteBatch,
    puts: usize,
}

impl WriteTransaction for RocksTransaction<'_> {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        validate_value(value)?;
        self.batch.put_cf(&self.cf, key, value);
        self.puts += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.puts
    }

    fn commit(self) -> Result<(), StorageError> {
        self.store.db.write_opt(self.batch, &self.store.write_opts)?;
        Ok(())
    }

    fn abort(self) -> Result<(), StorageError> {
        Ok(())
    }
}
