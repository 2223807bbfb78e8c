// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Ordered store, cursor and transaction trait definitions.

use super::error::StorageError;

/// Maximum key size in bytes.
pub const MAX_KEY_SIZE: usize = 8 * 1024; // 8KB

/// Maximum value size in bytes.
pub const MAX_VALUE_SIZE: usize = 64 * 1024 * 1024; // 64MB

/// A sorted key-value container with cursors and atomic write transactions.
///
/// Keys are compared as raw bytes. Cursors and transactions borrow the store,
/// so neither can outlive it. Both release their resources on drop.
pub trait OrderedStore: Send + Sync {
    /// Read cursor type.
    type Cursor<'a>: Cursor
    where
        Self: 'a;

    /// Write transaction type.
    type Transaction<'a>: WriteTransaction
    where
        Self: 'a;

    /// Opens a non-exclusive read cursor. The cursor starts unpositioned.
    fn cursor(&self) -> Result<Self::Cursor<'_>, StorageError>;

    /// Begins a write transaction.
    ///
    /// Fails with `StorageError::ReadOnly` on read-only stores.
    fn begin(&self) -> Result<Self::Transaction<'_>, StorageError>;

    /// Returns true if the store rejects writes.
    fn is_read_only(&self) -> bool;

    /// Forces buffered data to durable storage.
    fn flush(&self) -> Result<(), StorageError>;
}

/// A bidirectional traversal over an ordered store.
///
/// Positioning methods return `Ok(true)` when the cursor lands on a record and
/// `Ok(false)` when it runs off either end of the key space.
pub trait Cursor {
    /// Positions at the smallest key `>= key`.
    fn seek_ceiling(&mut self, key: &[u8]) -> Result<bool, StorageError>;

    /// Positions at the largest key in the store.
    fn seek_last(&mut self) -> Result<bool, StorageError>;

    /// Moves to the next larger key.
    fn next(&mut self) -> Result<bool, StorageError>;

    /// Moves to the next smaller key.
    fn prev(&mut self) -> Result<bool, StorageError>;

    /// Current key, or `None` if the cursor is not positioned.
    fn key(&self) -> Option<&[u8]>;

    /// Current value, or `None` if the cursor is not positioned.
    fn value(&self) -> Option<&[u8]>;

    /// Returns true if the cursor is positioned on a record.
    fn valid(&self) -> bool {
        self.key().is_some()
    }
}

/// An atomic unit of writes.
///
/// `commit` and `abort` consume the transaction, so exactly one terminal
/// operation runs. Dropping an unfinished transaction aborts it.
pub trait WriteTransaction {
    /// Inserts or overwrites `key`.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Number of puts accepted so far.
    fn len(&self) -> usize;

    /// Returns true if no put was accepted yet.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Makes every put durable and visible at once.
    fn commit(self) -> Result<(), StorageError>;

    /// Discards every put.
    fn abort(self) -> Result<(), StorageError>;
}

/// Validates key size.
#[inline]
pub(crate) fn validate_key(key: &[u8]) -> Result<(), StorageError> {
    if key.len() > MAX_KEY_SIZE {
        return Err(StorageError::KeyTooLarge {
            size: key.len(),
            max: MAX_KEY_SIZE,
        });
    }
    Ok(())
}

/// Validates value size.
#[inline]
pub(crate) fn validate_value(value: &[u8]) -> Result<(), StorageError> {
    if value.len() > MAX_VALUE_SIZE {
        return Err(StorageError::ValueTooLarge {
            size: value.len(),
            max: MAX_VALUE_SIZE,
        });
    }
    Ok(())
}
