// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Ordered key-value storage.
//!
//! The index is layered on top of any sorted key-value engine that offers
//! three things:
//!
//! - a **cursor** that can seek to the smallest key greater than or equal to
//!   a start key and then step forward or backward one record at a time,
//! - a **write transaction** whose puts become visible all at once on commit
//!   and not at all on abort,
//! - a **handle** that owns both and outlives them.
//!
//! [`OrderedStore`], [`Cursor`] and [`WriteTransaction`] capture that
//! surface. Two engines implement it: [`RocksStore`] for durable storage and
//! [`MemoryStore`] for tests and tooling.
//!
//! # Example
//!
//! ```no_run
//! use cdxdb::storage::{Cursor, OrderedStore, RocksStore, WriteTransaction};
//! use std::path::Path;
//!
//! let store = RocksStore::open(Path::new("/tmp/cdx"), "captures").unwrap();
//!
//! let mut txn = store.begin().unwrap();
//! txn.put(b"example.org/ 20050101000000", b"...").unwrap();
//! txn.commit().unwrap();
//!
//! let mut cursor = store.cursor().unwrap();
//! let mut found = cursor.seek_ceiling(b"example.org/").unwrap();
//! while found {
//!     println!("{:?}", cursor.key());
//!     found = cursor.next().unwrap();
//! }
//! ```

mod error;
mod memory;
mod rocks;
mod store;

pub use error::StorageError;
pub use memory::{MemoryCursor, MemoryStore, MemoryTransaction, StoreStats};
pub use rocks::{DurabilityMode, RocksCursor, RocksStore, RocksTransaction};
pub use store::{Cursor, OrderedStore, WriteTransaction, MAX_KEY_SIZE, MAX_VALUE_SIZE};
