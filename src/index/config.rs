// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Configuration for opening a capture index.

use rocksdb::Options;

use crate::scan::DecodePolicy;
use crate::storage::DurabilityMode;

/// Default target size of a store data file, in bytes.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 256_000_000;

/// Configuration for [`CaptureIndex::open`](super::CaptureIndex::open).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// Open without write access. Writes fail with `IndexError::ReadOnly`.
    pub read_only: bool,
    /// Create the store directory if it does not exist.
    pub create_if_missing: bool,
    /// Sync behavior of committed batches.
    pub durability: DurabilityMode,
    /// Target size of one data file, in bytes.
    pub max_file_size: u64,
    /// What scans do with records the codec rejects.
    pub decode_policy: DecodePolicy,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            read_only: false,
            create_if_missing: true,
            durability: DurabilityMode::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            decode_policy: DecodePolicy::default(),
        }
    }
}

impl IndexConfig {
    /// Creates a read-write configuration.
    pub fn read_write() -> Self {
        Self::default()
    }

    /// Creates a read-only configuration.
    pub fn read_only() -> Self {
        Self::default().with_read_only(true)
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Sets the durability mode for commits.
    pub fn with_durability(mut self, durability: DurabilityMode) -> Self {
        self.durability = durability;
        self
    }

    /// Sets the target data file size.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Sets the decode policy for scans.
    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    /// Builds the RocksDB options for this configuration.
    pub(crate) fn rocks_options(&self) -> Options {
        let mut opts = Options::default();
        opts.create_if_missing(self.create_if_missing && !self.read_only);
        opts.set_target_file_size_base(self.max_file_size);
        opts
    }
}
