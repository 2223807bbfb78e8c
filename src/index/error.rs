// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Index error types.

use crate::cdx::CodecError;
use crate::scan::ScanError;
use crate::storage::StorageError;

/// Errors returned by [`CaptureIndex`](super::CaptureIndex) operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("index opened in read-only mode")]
    ReadOnly,

    #[error("codec error at {at}: {source}")]
    Codec {
        /// Stored key or batch position of the offending record.
        at: String,
        #[source]
        source: CodecError,
    },

    #[error("failed to write key {}: {}", String::from_utf8_lossy(.key), .source)]
    WriteFailure {
        key: Vec<u8>,
        #[source]
        source: StorageError,
    },

    #[error("transaction failed: {source}")]
    Transaction {
        #[source]
        source: StorageError,
    },

    #[error("{cause}; aborting the batch also failed: {source}")]
    AbortFailed {
        /// The failure that triggered the abort.
        cause: Box<IndexError>,
        #[source]
        source: StorageError,
    },

    #[error("storage error: {0}")]
    Storage(#[source] StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for IndexError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(reason) => IndexError::StoreUnavailable(reason),
            StorageError::ReadOnly => IndexError::ReadOnly,
            other => IndexError::Storage(other),
        }
    }
}

impl From<ScanError> for IndexError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Storage(err) => err.into(),
            ScanError::Codec { key, source } => IndexError::Codec {
                at: format!("key {:?}", String::from_utf8_lossy(&key)),
                source,
            },
        }
    }
}
