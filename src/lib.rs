// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! cdxdb: an ordered index of web-capture (CDX) records
//!
//! This crate stores capture metadata in a sorted key space and answers two
//! kinds of request: filtered range scans walked forward or backward from a
//! search key, and atomic batch writes that either fully commit or leave the
//! index unchanged.

pub mod cdx;
pub mod index;
pub mod scan;
pub mod storage;

pub use cdx::{CaptureRecord, CaptureTimestamp, CdxCodec, CodecError, RawCodec, RawRecord, RecordCodec};
pub use index::{BatchStats, BatchWriter, CaptureIndex, IndexConfig, IndexError};
pub use scan::{
    DecodePolicy, Direction, Filter, FilterDecision, RangeScanner, ResultSink, ScanError,
    ScanStats, Sink,
};
pub use storage::{
    Cursor, DurabilityMode, MemoryStore, OrderedStore, RocksStore, StorageError, WriteTransaction,
};
