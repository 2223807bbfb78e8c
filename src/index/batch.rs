// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Atomic batch writes.
//!
//! A batch is written through one store transaction. Every record is encoded
//! and put in iteration order; the first failure aborts the transaction and
//! nothing from the batch becomes visible. A later put of a key overwrites an
//! earlier one, inside a batch and across batches.

use std::borrow::Borrow;

use tracing::{debug, warn};

use crate::cdx::RecordCodec;
use crate::storage::{OrderedStore, StorageError, WriteTransaction};

use super::IndexError;

/// Counters from one committed batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    /// Records put, duplicates included.
    pub records: usize,
    /// Encoded key and value bytes put.
    pub bytes: u64,
}

/// Writes batches of records to a store.
pub struct BatchWriter<'s, S, C> {
    store: &'s S,
    codec: &'s C,
}

impl<'s, S: OrderedStore, C: RecordCodec> BatchWriter<'s, S, C> {
    pub fn new(store: &'s S, codec: &'s C) -> Self {
        Self { store, codec }
    }

    /// Writes every record in one transaction.
    ///
    /// An empty batch commits an empty transaction. Read-only stores are
    /// rejected before a transaction is begun.
    pub fn write_all<I>(&self, records: I) -> Result<BatchStats, IndexError>
    where
        I: IntoIterator,
        I::Item: Borrow<C::Record>,
    {
        if self.store.is_read_only() {
            return Err(IndexError::ReadOnly);
        }

        let mut txn = self.store.begin().map_err(|source| match source {
            StorageError::ReadOnly => IndexError::ReadOnly,
            StorageError::Unavailable(reason) => IndexError::StoreUnavailable(reason),
            source => IndexError::Transaction { source },
        })?;

        let mut stats = BatchStats::default();
        for (position, record) in records.into_iter().enumerate() {
            let (key, value) = match self.codec.encode(record.borrow()) {
                Ok(pair) => pair,
                Err(source) => {
                    let cause = IndexError::Codec {
                        at: format!("batch record {position}"),
                        source,
                    };
                    return Err(abort(txn, position, cause));
                }
            };
            if let Err(source) = txn.put(&key, &value) {
                let cause = IndexError::WriteFailure { key, source };
                return Err(abort(txn, position, cause));
            }
            stats.records += 1;
            stats.bytes += (key.len() + value.len()) as u64;
        }

        txn.commit()
            .map_err(|source| IndexError::Transaction { source })?;

        debug!(records = stats.records, bytes = stats.bytes, "batch committed");
        Ok(stats)
    }
}

/// Aborts `txn` and returns the error to report for the failed batch.
///
/// A failed abort is wrapped together with `cause`.
fn abort<T: WriteTransaction>(txn: T, position: usize, cause: IndexError) -> IndexError {
    match txn.abort() {
        Ok(()) => {
            debug!(position, "batch aborted");
            cause
        }
        Err(source) => {
            warn!(position, error = %source, "failed to abort batch");
            IndexError::AbortFailed {
                cause: Box::new(cause),
                source,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdx::{CaptureRecord, CdxCodec, RawCodec, RawRecord};
    use crate::storage::{Cursor, MemoryStore, RocksStore, MAX_KEY_SIZE};
    use tempfile::TempDir;

    fn raw(pairs: &[(&str, &str)]) -> Vec<RawRecord> {
        pairs.iter().map(|&pair| RawRecord::from(pair)).collect()
    }

    #[test]
    fn test_write_all_commits() {
        let store = MemoryStore::new();
        let writer = BatchWriter::new(&store, &RawCodec);

        let stats = writer.write_all(raw(&[("d", "1"), ("e", "1")])).unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.bytes, 4);
        assert_eq!(store.get(b"d"), Some(b"1".to_vec()));
        assert_eq!(store.get(b"e"), Some(b"1".to_vec()));
        assert_eq!(store.stats().txns_committed, 1);
    }

    #[test]
    fn test_failed_put_leaves_store_unchanged() {
        let store = MemoryStore::from_entries([("a", "0")]);
        store.reject_puts_for("c");
        let writer = BatchWriter::new(&store, &RawCodec);

        let result = writer.write_all(raw(&[("a", "1"), ("b", "1"), ("c", "1"), ("d", "1")]));
        match result {
            Err(IndexError::WriteFailure { key, source }) => {
                assert_eq!(key, b"c");
                assert!(matches!(source, StorageError::PutRejected { .. }));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(b"a"), Some(b"0".to_vec()));
        let stats = store.stats();
        assert_eq!(stats.txns_aborted, 1);
        assert_eq!(stats.txns_committed, 0);
        assert_eq!(stats.open_txns(), 0);
    }

    #[test]
    fn test_failed_abort_reports_both_errors() {
        let store = MemoryStore::from_entries([("a", "0")]);
        store.reject_puts_for("b");
        store.reject_aborts();
        let writer = BatchWriter::new(&store, &RawCodec);

        let result = writer.write_all(raw(&[("a", "1"), ("b", "1")]));
        match result {
            Err(IndexError::AbortFailed { cause, source }) => {
                assert!(matches!(
                    *cause,
                    IndexError::WriteFailure {
                        source: StorageError::PutRejected { .. },
                        ..
                    }
                ));
                assert!(matches!(source, StorageError::AbortRejected));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(b"a"), Some(b"0".to_vec()));
        assert_eq!(store.stats().txns_committed, 0);
    }

    #[test]
    fn test_encode_failure_aborts() {
        let store = MemoryStore::new();
        let writer = BatchWriter::new(&store, &CdxCodec);

        let good = CaptureRecord::from_cdx_line(
            "example.org/ 20050101000000 http://example.org/ text/html 200 D - - 1 0 a.warc.gz",
        )
        .unwrap();
        let mut bad = good.clone();
        bad.filename = "two words".into();

        let result = writer.write_all([&good, &bad]);
        assert!(matches!(result, Err(IndexError::Codec { ref at, .. }) if at == "batch record 1"));
        assert!(store.is_empty());
        assert_eq!(store.stats().txns_aborted, 1);
    }

    #[test]
    fn test_overwrite_within_and_across_batches() {
        let store = MemoryStore::new();
        let writer = BatchWriter::new(&store, &RawCodec);

        writer.write_all(raw(&[("k", "1"), ("k", "2")])).unwrap();
        assert_eq!(store.get(b"k"), Some(b"2".to_vec()));
        assert_eq!(store.len(), 1);

        writer.write_all(raw(&[("k", "3")])).unwrap();
        assert_eq!(store.get(b"k"), Some(b"3".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let store = MemoryStore::new();
        let writer = BatchWriter::new(&store, &RawCodec);

        let stats = writer.write_all(Vec::<RawRecord>::new()).unwrap();
        assert_eq!(stats, BatchStats::default());
        assert_eq!(store.stats().txns_committed, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_read_only_rejected_before_begin() {
        let store = MemoryStore::read_only([("a", "1")]);
        let writer = BatchWriter::new(&store, &RawCodec);

        let result = writer.write_all(raw(&[("b", "1")]));
        assert!(matches!(result, Err(IndexError::ReadOnly)));
        assert_eq!(store.stats().txns_begun, 0);
    }

    #[test]
    fn test_rocks_oversized_key_aborts() {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path(), "cdx").unwrap();
        let writer = BatchWriter::new(&store, &RawCodec);

        let big = "k".repeat(MAX_KEY_SIZE + 1);
        let result = writer.write_all(raw(&[("a", "1"), (big.as_str(), "1")]));
        assert!(matches!(
            result,
            Err(IndexError::WriteFailure {
                source: StorageError::KeyTooLarge { .. },
                ..
            })
        ));

        let mut cursor = store.cursor().unwrap();
        assert!(!cursor.seek_ceiling(b"").unwrap());
    }
}
