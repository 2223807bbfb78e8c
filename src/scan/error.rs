// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Scan error types.

use crate::cdx::CodecError;
use crate::storage::StorageError;

/// Errors that end a scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("cannot decode record at key {}: {}", String::from_utf8_lossy(.key), .source)]
    Codec {
        key: Vec<u8>,
        #[source]
        source: CodecError,
    },
}
