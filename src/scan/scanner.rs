// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! The range scanner.

use tracing::{debug, warn};

use crate::cdx::RecordCodec;
use crate::storage::{Cursor, OrderedStore};

use super::{Direction, Filter, FilterDecision, ResultSink, ScanError, Sink};

/// What a scan does with a stored pair the codec cannot decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// End the scan with `ScanError::Codec`.
    #[default]
    FailFast,
    /// Log the pair, count it as skipped and move on.
    Skip,
}

/// Counters from one scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    /// Records the cursor landed on, including undecodable ones.
    pub visited: u64,
    pub included: u64,
    pub excluded: u64,
    /// Undecodable records passed over under [`DecodePolicy::Skip`].
    pub skipped: u64,
    /// True if the filter ended the scan.
    pub aborted: bool,
}

/// Drives a cursor from a start key through a filter into a sink.
pub struct RangeScanner<'s, S, C> {
    store: &'s S,
    codec: &'s C,
    policy: DecodePolicy,
}

impl<'s, S: OrderedStore, C: RecordCodec> RangeScanner<'s, S, C> {
    /// Creates a scanner with the fail-fast decode policy.
    pub fn new(store: &'s S, codec: &'s C) -> Self {
        Self {
            store,
            codec,
            policy: DecodePolicy::default(),
        }
    }

    /// Sets the decode policy.
    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Scans from `start_key` and returns the included records in ascending
    /// key order.
    pub fn scan<F>(
        &self,
        start_key: &[u8],
        direction: Direction,
        filter: &mut F,
    ) -> Result<Vec<C::Record>, ScanError>
    where
        F: Filter<C::Record> + ?Sized,
    {
        let mut sink = ResultSink::new();
        self.scan_into(start_key, direction, filter, &mut sink)?;
        Ok(sink.into_vec())
    }

    /// Scans from `start_key`, feeding included records to `sink`.
    ///
    /// A forward scan visits keys `>= start_key` in ascending order. A
    /// backward scan visits keys `< start_key` in descending order. Either
    /// way the scan is empty when no stored key is `>= start_key`. The
    /// cursor is released on every return path.
    pub fn scan_into<F, K>(
        &self,
        start_key: &[u8],
        direction: Direction,
        filter: &mut F,
        sink: &mut K,
    ) -> Result<ScanStats, ScanError>
    where
        F: Filter<C::Record> + ?Sized,
        K: Sink<C::Record> + ?Sized,
    {
        let mut cursor = self.store.cursor()?;
        let mut stats = ScanStats::default();

        let mut positioned = cursor.seek_ceiling(start_key)?;
        if positioned && direction == Direction::Backward {
            positioned = cursor.prev()?;
        }

        while positioned {
            let (Some(key), Some(value)) = (cursor.key(), cursor.value()) else {
                break;
            };
            stats.visited += 1;

            let record = match self.codec.decode(key, value) {
                Ok(record) => record,
                Err(source) if self.policy == DecodePolicy::Skip => {
                    warn!(
                        key = %String::from_utf8_lossy(key),
                        error = %source,
                        "skipping undecodable record"
                    );
                    stats.skipped += 1;
                    positioned = direction.advance(&mut cursor)?;
                    continue;
                }
                Err(source) => {
                    return Err(ScanError::Codec {
                        key: key.to_vec(),
                        source,
                    });
                }
            };

            match filter.decide(&record) {
                FilterDecision::Abort => {
                    stats.aborted = true;
                    break;
                }
                FilterDecision::Include => {
                    stats.included += 1;
                    sink.accept(record, direction);
                }
                FilterDecision::Exclude => stats.excluded += 1,
            }

            positioned = direction.advance(&mut cursor)?;
        }

        debug!(
            start_key = %String::from_utf8_lossy(start_key),
            ?direction,
            visited = stats.visited,
            included = stats.included,
            excluded = stats.excluded,
            skipped = stats.skipped,
            aborted = stats.aborted,
            "scan finished"
        );
        Ok(stats)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::cdx::{RawCodec, RawRecord};
    use crate::scan::IncludeAll;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(b'a'..=b'e', 0..4)
    }

    fn store_of(keys: &BTreeSet<Vec<u8>>) -> MemoryStore {
        MemoryStore::from_entries(keys.iter().map(|k| (k.clone(), b"v".to_vec())))
    }

    fn keys_of(records: Vec<RawRecord>) -> Vec<Vec<u8>> {
        records.into_iter().map(|r| r.key).collect()
    }

    proptest! {
        #[test]
        fn forward_returns_keys_at_or_after_start(
            keys in prop::collection::btree_set(key_strategy(), 1..40),
            start in key_strategy(),
        ) {
            let store = store_of(&keys);
            let scanner = RangeScanner::new(&store, &RawCodec);
            let got = keys_of(scanner.scan(&start, Direction::Forward, &mut IncludeAll).unwrap());
            let want: Vec<_> = keys.iter().filter(|k| **k >= start).cloned().collect();
            prop_assert_eq!(got, want);
            prop_assert_eq!(store.stats().open_cursors(), 0);
        }

        #[test]
        fn backward_returns_keys_before_start(
            keys in prop::collection::btree_set(key_strategy(), 1..40),
            start in key_strategy(),
        ) {
            let store = store_of(&keys);
            let scanner = RangeScanner::new(&store, &RawCodec);

            let mut visited = Vec::new();
            let mut filter = |r: &RawRecord| {
                visited.push(r.key.clone());
                FilterDecision::Include
            };
            let got = keys_of(scanner.scan(&start, Direction::Backward, &mut filter).unwrap());

            // Without a key at or above the start there is nothing to step back from.
            let has_ceiling = keys.iter().any(|k| *k >= start);
            let want: Vec<_> = if has_ceiling {
                keys.iter().filter(|k| **k < start).cloned().collect()
            } else {
                Vec::new()
            };
            let mut descending = want.clone();
            descending.reverse();
            prop_assert_eq!(got, want);
            prop_assert_eq!(visited, descending);
        }

        #[test]
        fn abort_on_nth_keeps_n_minus_one(
            keys in prop::collection::btree_set(key_strategy(), 1..40),
            n in 1usize..50,
            forward in any::<bool>(),
        ) {
            let store = store_of(&keys);
            let scanner = RangeScanner::new(&store, &RawCodec);
            let last = keys.iter().next_back().cloned().unwrap_or_default();
            let (direction, start, available) = if forward {
                (Direction::Forward, Vec::new(), keys.len())
            } else {
                (Direction::Backward, last, keys.len() - 1)
            };

            let mut calls = 0usize;
            let mut filter = |_: &RawRecord| {
                calls += 1;
                if calls == n { FilterDecision::Abort } else { FilterDecision::Include }
            };
            let got = scanner.scan(&start, direction, &mut filter).unwrap();

            prop_assert_eq!(calls, n.min(available));
            prop_assert_eq!(got.len(), if n <= available { n - 1 } else { available });
            prop_assert!(got.windows(2).all(|w| w[0].key < w[1].key));
        }
    }
}
