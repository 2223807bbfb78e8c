// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! In-memory ordered store.
//!
//! Data lives in a copy-on-write `BTreeMap`. Cursors hold an `Arc` snapshot of
//! the map taken when they open, so readers never block the writer and every
//! scan sees one consistent state. Commits swap in a new map.
//!
//! The store counts cursor and transaction lifecycles and can be told to
//! reject puts for chosen keys, which makes it the store of choice for
//! exercising scan cleanup and batch atomicity.

use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};

use super::store::{validate_key, validate_value};
use super::{Cursor, OrderedStore, StorageError, WriteTransaction};

type Tree = BTreeMap<Vec<u8>, Vec<u8>>;

/// Lifecycle counters for cursors and transactions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub cursors_opened: u64,
    pub cursors_closed: u64,
    pub txns_begun: u64,
    pub txns_committed: u64,
    pub txns_aborted: u64,
}

impl StoreStats {
    /// Cursors opened but not yet released.
    #[inline]
    pub fn open_cursors(&self) -> u64 {
        self.cursors_opened - self.cursors_closed
    }

    /// Transactions begun but neither committed nor aborted.
    #[inline]
    pub fn open_txns(&self) -> u64 {
        self.txns_begun - self.txns_committed - self.txns_aborted
    }
}

#[derive(Debug, Default)]
struct Counters {
    cursors_opened: AtomicU64,
    cursors_closed: AtomicU64,
    txns_begun: AtomicU64,
    txns_committed: AtomicU64,
    txns_aborted: AtomicU64,
}

/// Ordered store backed by an in-memory `BTreeMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Arc<Tree>>,
    write_lock: Mutex<()>,
    rejected: Mutex<HashSet<Vec<u8>>>,
    reject_aborts: AtomicBool,
    counters: Counters,
    read_only: bool,
}

impl MemoryStore {
    /// Creates an empty, writable store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a read-only store holding `entries`.
    pub fn read_only<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Vec<u8>>,
        V: Into<Vec<u8>>,
    {
        let mut store = Self::from_entries(entries);
        store.read_only = true;
        store
    }

    /// Creates a writable store holding `entries`.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Vec<u8>>,
        V: Into<Vec<u8>>,
    {
        let tree: Tree = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            data: RwLock::new(Arc::new(tree)),
            ..Self::default()
        }
    }

    /// Makes every later put of `key` fail with `StorageError::PutRejected`.
    pub fn reject_puts_for(&self, key: impl Into<Vec<u8>>) {
        self.rejected.lock().insert(key.into());
    }

    /// Makes every later transaction abort fail with
    /// `StorageError::AbortRejected`. Pending puts are still discarded.
    pub fn reject_aborts(&self) {
        self.reject_aborts.store(true, Ordering::Release);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.read().get(key).cloned()
    }

    /// Returns a snapshot of the lifecycle counters.
    pub fn stats(&self) -> StoreStats {
        let c = &self.counters;
        StoreStats {
            cursors_opened: c.cursors_opened.load(Ordering::Acquire),
            cursors_closed: c.cursors_closed.load(Ordering::Acquire),
            txns_begun: c.txns_begun.load(Ordering::Acquire),
            txns_committed: c.txns_committed.load(Ordering::Acquire),
            txns_aborted: c.txns_aborted.load(Ordering::Acquire),
        }
    }

    fn snapshot(&self) -> Arc<Tree> {
        Arc::clone(&self.data.read())
    }
}

impl OrderedStore for MemoryStore {
    type Cursor<'a> = MemoryCursor<'a>;
    type Transaction<'a> = MemoryTransaction<'a>;

    fn cursor(&self) -> Result<MemoryCursor<'_>, StorageError> {
        self.counters.cursors_opened.fetch_add(1, Ordering::AcqRel);
        Ok(MemoryCursor {
            store: self,
            snapshot: self.snapshot(),
            current: None,
        })
    }

    fn begin(&self) -> Result<MemoryTransaction<'_>, StorageError> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        let guard = self.write_lock.lock();
        self.counters.txns_begun.fetch_add(1, Ordering::AcqRel);
        Ok(MemoryTransaction {
            store: self,
            _guard: guard,
            pending: Vec::new(),
            finished: false,
        })
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Cursor over a snapshot of a [`MemoryStore`].
pub struct MemoryCursor<'a> {
    store: &'a MemoryStore,
    snapshot: Arc<Tree>,
    current: Option<(Vec<u8>, Vec<u8>)>,
}

impl MemoryCursor<'_> {
    fn land(&mut self, entry: Option<(&Vec<u8>, &Vec<u8>)>) -> bool {
        let entry = entry.map(|(k, v)| (k.clone(), v.clone()));
        let found = entry.is_some();
        self.current = entry;
        found
    }
}

impl Cursor for MemoryCursor<'_> {
    fn seek_ceiling(&mut self, key: &[u8]) -> Result<bool, StorageError> {
        let snapshot = Arc::clone(&self.snapshot);
        let entry = snapshot
            .range::<[u8], _>((Bound::Included(key), Bound::Unbounded))
            .next();
        Ok(self.land(entry))
    }

    fn seek_last(&mut self) -> Result<bool, StorageError> {
        let snapshot = Arc::clone(&self.snapshot);
        let entry = snapshot.iter().next_back();
        Ok(self.land(entry))
    }

    fn next(&mut self) -> Result<bool, StorageError> {
        let Some((current, _)) = self.current.take() else {
            return Ok(false);
        };
        let snapshot = Arc::clone(&self.snapshot);
        let entry = snapshot
            .range::<[u8], _>((Bound::Excluded(current.as_slice()), Bound::Unbounded))
            .next();
        Ok(self.land(entry))
    }

    fn prev(&mut self) -> Result<bool, StorageError> {
        let Some((current, _)) = self.current.take() else {
            return Ok(false);
        };
        let snapshot = Arc::clone(&self.snapshot);
        let entry = snapshot
            .range::<[u8], _>((Bound::Unbounded, Bound::Excluded(current.as_slice())))
            .next_back();
        Ok(self.land(entry))
    }

    fn key(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|(k, _)| k.as_slice())
    }

    fn value(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|(_, v)| v.as_slice())
    }
}

impl Drop for MemoryCursor<'_> {
    fn drop(&mut self) {
        self.store
            .counters
            .cursors_closed
            .fetch_add(1, Ordering::AcqRel);
    }
}

/// Write transaction on a [`MemoryStore`].
///
/// Holds the store's write lock for its whole lifetime.
pub struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    _guard: MutexGuard<'a, ()>,
    pending: Vec<(Vec<u8>, Vec<u8>)>,
    finished: bool,
}

impl WriteTransaction for MemoryTransaction<'_> {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        validate_value(value)?;
        if self.store.rejected.lock().contains(key) {
            return Err(StorageError::PutRejected { key: key.to_vec() });
        }
        self.pending.push((key.to_vec(), value.to_vec()));
        Ok(())
    }

    fn len(&self) -> usize {
        self.pending.len()
    }

    fn commit(mut self) -> Result<(), StorageError> {
        let pending = std::mem::take(&mut self.pending);
        {
            let mut data = self.store.data.write();
            let tree = Arc::make_mut(&mut data);
            for (key, value) in pending {
                tree.insert(key, value);
            }
        }
        self.finished = true;
        self.store
            .counters
            .txns_committed
            .fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn abort(mut self) -> Result<(), StorageError> {
        self.pending.clear();
        self.finished = true;
        if self.store.reject_aborts.load(Ordering::Acquire) {
            return Err(StorageError::AbortRejected);
        }
        self.store
            .counters
            .txns_aborted
            .fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.store
                .counters
                .txns_aborted
                .fetch_add(1, Ordering::AcqRel);
        }
    }
}
