// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Filtered range scans over an ordered store.
//!
//! A scan begins at a start key and walks the key space one record at a time
//! in either direction. A [`Filter`] rules on every record it visits:
//!
//! - [`FilterDecision::Include`] forwards the record to the [`Sink`],
//! - [`FilterDecision::Exclude`] drops it and keeps going,
//! - [`FilterDecision::Abort`] drops it and ends the scan.
//!
//! # Seek asymmetry
//!
//! A forward scan from `K` starts at the smallest key `>= K`, so it includes
//! `K` itself. A backward scan from `K` starts one record before that, so it
//! covers the keys `< K`. Together the two answer "this point and after" and
//! "everything before this point".
//!
//! Both directions start from the ceiling of `K`. When no stored key is
//! `>= K` there is nothing to step back from and either scan is empty.
//!
//! Sinks receive records tagged with the scan direction and keep them in
//! ascending key order either way.

mod error;
mod filter;
mod scanner;
mod sink;

pub use error::ScanError;
pub use filter::{
    DateRange, ExcludeAll, FieldMatch, Filter, FilterChain, FilterDecision, IncludeAll, Limit,
    UrlMatch,
};
pub use scanner::{DecodePolicy, RangeScanner, ScanStats};
pub use sink::{ResultSink, Sink};

use crate::storage::{Cursor, StorageError};

/// Traversal direction of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Ascending key order, starting at the start key.
    #[default]
    Forward,
    /// Descending key order, starting just before the start key.
    Backward,
}

impl Direction {
    /// Returns true for [`Direction::Forward`].
    #[inline]
    pub fn is_forward(self) -> bool {
        self == Direction::Forward
    }

    /// Returns the opposite direction.
    #[inline]
    pub fn reverse(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    /// Steps `cursor` one record in this direction.
    #[inline]
    pub(crate) fn advance<C: Cursor + ?Sized>(self, cursor: &mut C) -> Result<bool, StorageError> {
        match self {
            Direction::Forward => cursor.next(),
            Direction::Backward => cursor.prev(),
        }
    }
}
