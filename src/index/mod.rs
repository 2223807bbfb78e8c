// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! The capture index handle.
//!
//! [`CaptureIndex`] owns an ordered store and a record codec. It is the one
//! object callers pass around: opening it acquires the store, every scan and
//! batch borrows it, and [`CaptureIndex::close`] consumes it, so a closed
//! index cannot be used again.
//!
//! # Example
//!
//! ```no_run
//! use cdxdb::index::{CaptureIndex, IndexConfig};
//! use cdxdb::cdx::CaptureRecord;
//! use cdxdb::scan::{Direction, IncludeAll};
//!
//! let index = CaptureIndex::open("/tmp/cdx", "captures", IndexConfig::default())?;
//! let record = CaptureRecord::from_cdx_line(
//!     "example.org/ 20050614120000 http://example.org/ text/html 200 3I42H3S6 - - 2201 1043 IA-001.arc.gz",
//! )?;
//! index.write_all([&record])?;
//!
//! let captures = index.query_url("http://www.example.org/", None)?;
//! assert_eq!(captures.len(), 1);
//!
//! for capture in index.scan(b"", Direction::Forward, &mut IncludeAll)? {
//!     println!("{}", capture.to_cdx_line());
//! }
//! index.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod batch;
mod config;
mod error;
mod query;

pub use batch::{BatchStats, BatchWriter};
pub use config::{IndexConfig, DEFAULT_MAX_FILE_SIZE};
pub use error::IndexError;

use std::borrow::Borrow;
use std::cell::Cell;
use std::io::Write;
use std::path::Path;

use tracing::{info, instrument};

use crate::cdx::{CdxCodec, RawCodec, RawRecord, RecordCodec};
use crate::scan::{
    DecodePolicy, Direction, Filter, FilterDecision, RangeScanner, ScanStats, Sink,
};
use crate::storage::{OrderedStore, RocksStore};

/// An ordered index of records over a store.
pub struct CaptureIndex<S, C = CdxCodec> {
    store: S,
    codec: C,
    decode_policy: DecodePolicy,
}

impl CaptureIndex<RocksStore, CdxCodec> {
    /// Opens the capture index stored under `namespace` at `location`.
    ///
    /// A read-only open fails with `IndexError::StoreUnavailable` if the
    /// store or the namespace does not exist.
    #[instrument(skip(location, config), fields(location = %location.as_ref().display()))]
    pub fn open(
        location: impl AsRef<Path>,
        namespace: &str,
        config: IndexConfig,
    ) -> Result<Self, IndexError> {
        let store = RocksStore::open_with_options(
            location.as_ref(),
            namespace,
            config.rocks_options(),
            config.durability,
            config.read_only,
        )?;
        Ok(Self::from_store(store, CdxCodec).with_decode_policy(config.decode_policy))
    }

    /// Directory the index was opened from.
    pub fn location(&self) -> &Path {
        self.store.path()
    }

    /// Namespace holding this index's records.
    pub fn namespace(&self) -> &str {
        self.store.namespace()
    }
}

impl<S: OrderedStore, C: RecordCodec> CaptureIndex<S, C> {
    /// Wraps an already opened store.
    pub fn from_store(store: S, codec: C) -> Self {
        Self {
            store,
            codec,
            decode_policy: DecodePolicy::default(),
        }
    }

    /// Sets the decode policy used by scans.
    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn is_read_only(&self) -> bool {
        self.store.is_read_only()
    }

    /// Flushes a writable store and releases it.
    #[instrument(skip(self))]
    pub fn close(self) -> Result<(), IndexError> {
        if !self.store.is_read_only() {
            self.store.flush()?;
        }
        info!("capture index closed");
        Ok(())
    }

    /// Scans from `start_key` and returns the included records in ascending
    /// key order.
    ///
    /// A forward scan covers keys `>= start_key`, a backward scan keys
    /// `< start_key`. See [`crate::scan`] for the filter contract.
    #[instrument(skip(self, start_key, filter), fields(start_key = %String::from_utf8_lossy(start_key)))]
    pub fn scan<F>(
        &self,
        start_key: &[u8],
        direction: Direction,
        filter: &mut F,
    ) -> Result<Vec<C::Record>, IndexError>
    where
        F: Filter<C::Record> + ?Sized,
    {
        Ok(self.scanner().scan(start_key, direction, filter)?)
    }

    /// Scans from `start_key` into a caller-supplied sink.
    #[instrument(skip(self, start_key, filter, sink), fields(start_key = %String::from_utf8_lossy(start_key)))]
    pub fn scan_into<F, K>(
        &self,
        start_key: &[u8],
        direction: Direction,
        filter: &mut F,
        sink: &mut K,
    ) -> Result<ScanStats, IndexError>
    where
        F: Filter<C::Record> + ?Sized,
        K: Sink<C::Record> + ?Sized,
    {
        Ok(self.scanner().scan_into(start_key, direction, filter, sink)?)
    }

    /// Writes `records` as one atomic batch.
    #[instrument(skip(self, records))]
    pub fn write_all<I>(&self, records: I) -> Result<BatchStats, IndexError>
    where
        I: IntoIterator,
        I::Item: Borrow<C::Record>,
    {
        BatchWriter::new(&self.store, &self.codec).write_all(records)
    }

    /// Writes every stored pair from `start_key` onwards as a `"key value"`
    /// line. Returns the number of lines written.
    #[instrument(skip(self, start_key, writer), fields(start_key = %String::from_utf8_lossy(start_key)))]
    pub fn dump<W: Write + ?Sized>(&self, start_key: &[u8], writer: &mut W) -> Result<usize, IndexError> {
        let failed = Cell::new(false);
        let mut filter = |_: &RawRecord| {
            if failed.get() {
                FilterDecision::Abort
            } else {
                FilterDecision::Include
            }
        };
        let mut sink = LineSink {
            writer,
            lines: 0,
            error: None,
            failed: &failed,
        };

        RangeScanner::new(&self.store, &RawCodec).scan_into(
            start_key,
            Direction::Forward,
            &mut filter,
            &mut sink,
        )?;

        if let Some(err) = sink.error {
            return Err(err.into());
        }
        sink.writer.flush()?;
        Ok(sink.lines)
    }

    fn scanner(&self) -> RangeScanner<'_, S, C> {
        RangeScanner::new(&self.store, &self.codec).with_decode_policy(self.decode_policy)
    }
}

/// Writes records as lines; stops the scan through `failed` on I/O error.
struct LineSink<'a, W: ?Sized> {
    writer: &'a mut W,
    lines: usize,
    error: Option<std::io::Error>,
    failed: &'a Cell<bool>,
}

impl<W: Write + ?Sized> Sink<RawRecord> for LineSink<'_, W> {
    fn accept(&mut self, record: RawRecord, _: Direction) {
        match writeln!(self.writer, "{record}") {
            Ok(()) => self.lines += 1,
            Err(err) => {
                self.error = Some(err);
                self.failed.set(true);
            }
        }
    }
}
