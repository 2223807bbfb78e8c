// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Capture lookups built on range scans.

use tracing::debug;

use crate::cdx::{CaptureRecord, CaptureTimestamp, CdxCodec};
use crate::scan::{Direction, Filter, Limit, ResultSink, UrlMatch};
use crate::storage::{Cursor, OrderedStore};

use super::{CaptureIndex, IndexError};

impl<S: OrderedStore> CaptureIndex<S, CdxCodec> {
    /// Returns the captures of `url` in ascending date order, at most
    /// `limit` of them.
    pub fn query_url(
        &self,
        url: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CaptureRecord>, IndexError> {
        let matcher = UrlMatch::exact(url);
        // The separator keeps `example.org/a` from matching `example.org/ab`.
        let start = format!("{} ", matcher.key());
        self.forward_limited(start.as_bytes(), matcher, limit)
    }

    /// Returns the captures of every URL whose key starts with the key of
    /// `url_prefix`, ordered by URL key then date, at most `limit` of them.
    pub fn query_prefix(
        &self,
        url_prefix: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CaptureRecord>, IndexError> {
        let matcher = UrlMatch::prefix(url_prefix);
        let start = matcher.key().to_string();
        self.forward_limited(start.as_bytes(), matcher, limit)
    }

    /// Returns the `n` captures of `url` closest in time to `at`, in
    /// ascending date order.
    ///
    /// Runs one forward scan and one backward scan from `at`, each bounded
    /// to `n` records, then keeps the `n` nearest. On equal distance the
    /// earlier capture wins. When `at` sorts after every stored key the
    /// backward side starts from the last key.
    pub fn closest(
        &self,
        url: &str,
        at: CaptureTimestamp,
        n: usize,
    ) -> Result<Vec<CaptureRecord>, IndexError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let matcher = UrlMatch::exact(url);
        let target = format!("{} {}", matcher.key(), at);

        let mut sink = ResultSink::new();
        let after = self.scan_into(
            target.as_bytes(),
            Direction::Forward,
            &mut Limit::new(matcher.clone(), n),
            &mut sink,
        )?;
        let before = if after.visited > 0 {
            self.scan_into(
                target.as_bytes(),
                Direction::Backward,
                &mut Limit::new(matcher, n),
                &mut sink,
            )?
            .included as usize
        } else {
            // Every stored key sorts before the target, so a backward scan from
            // it is empty. Walk back from the last key instead, taking that
            // key itself with a forward step first.
            match self.last_key()? {
                Some(last) => {
                    let mut filter = Limit::new(matcher, n);
                    self.scan_into(&last, Direction::Forward, &mut filter, &mut sink)?;
                    self.scan_into(&last, Direction::Backward, &mut filter, &mut sink)?;
                    sink.len()
                }
                None => 0,
            }
        };

        // `[..before]` is earlier than `at`, `[before..]` at or after it.
        let candidates = sink.into_vec();
        let distance = |i: usize| candidates[i].timestamp.seconds_between(&at);
        let (mut lo, mut hi) = (before, before);
        while hi - lo < n {
            let earlier = lo.checked_sub(1).map(distance);
            let later = (hi < candidates.len()).then(|| distance(hi));
            match (earlier, later) {
                (Some(e), Some(l)) if e <= l => lo -= 1,
                (Some(_), None) => lo -= 1,
                (_, Some(_)) => hi += 1,
                (None, None) => break,
            }
        }

        debug!(url, candidates = candidates.len(), kept = hi - lo, "closest captures");
        Ok(candidates.into_iter().skip(lo).take(hi - lo).collect())
    }

    fn last_key(&self) -> Result<Option<Vec<u8>>, IndexError> {
        let mut cursor = self.store().cursor()?;
        let last = if cursor.seek_last()? {
            cursor.key().map(<[u8]>::to_vec)
        } else {
            None
        };
        Ok(last)
    }

    fn forward_limited(
        &self,
        start: &[u8],
        matcher: UrlMatch,
        limit: Option<usize>,
    ) -> Result<Vec<CaptureRecord>, IndexError> {
        let mut filter: Box<dyn Filter<CaptureRecord>> = match limit {
            Some(limit) => Box::new(Limit::new(matcher, limit)),
            None => Box::new(matcher),
        };
        self.scan(start, Direction::Forward, filter.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdx::url_key;
    use crate::storage::MemoryStore;

    fn capture(url: &str, ts: &str) -> CaptureRecord {
        CaptureRecord::from_cdx_line(&format!(
            "{} {ts} {url} text/html 200 DIGEST - - 100 0 a.warc.gz",
            url_key(url)
        ))
        .unwrap()
    }

    fn index_of(captures: &[CaptureRecord]) -> CaptureIndex<MemoryStore, CdxCodec> {
        let index = CaptureIndex::from_store(MemoryStore::new(), CdxCodec);
        index.write_all(captures).unwrap();
        index
    }

    fn timestamps(records: &[CaptureRecord]) -> Vec<String> {
        records.iter().map(|r| r.timestamp.to_string()).collect()
    }

    fn sample() -> CaptureIndex<MemoryStore, CdxCodec> {
        index_of(&[
            capture("http://example.org/", "20050101000000"),
            capture("http://example.org/", "20060101000000"),
            capture("http://example.org/", "20070101000000"),
            capture("http://example.org/", "20080101000000"),
            capture("http://example.org/a", "20050101000000"),
            capture("http://example.org/ab", "20050101000000"),
            capture("http://example.net/", "20050101000000"),
        ])
    }

    fn ts(digits: &str) -> CaptureTimestamp {
        CaptureTimestamp::parse(digits).unwrap()
    }

    #[test]
    fn test_query_url() {
        let index = sample();

        let all = index.query_url("https://www.example.org/", None).unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|r| r.url_key == "example.org/"));
        assert!(all.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

        let first_two = index.query_url("http://example.org/", Some(2)).unwrap();
        assert_eq!(timestamps(&first_two), vec!["20050101000000", "20060101000000"]);

        let only_a = index.query_url("http://example.org/a", None).unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].url_key, "example.org/a");

        assert!(index.query_url("http://missing.org/", None).unwrap().is_empty());
        assert!(index.query_url("http://example.org/", Some(0)).unwrap().is_empty());
    }

    #[test]
    fn test_query_prefix() {
        let index = sample();

        let under_a = index.query_prefix("http://example.org/a", None).unwrap();
        let keys: Vec<_> = under_a.iter().map(|r| r.url_key.as_str()).collect();
        assert_eq!(keys, vec!["example.org/a", "example.org/ab"]);

        let host = index.query_prefix("http://example.org/", Some(5)).unwrap();
        assert_eq!(host.len(), 5);
        assert!(host.iter().all(|r| r.url_key.starts_with("example.org/")));
    }

    #[test]
    fn test_closest() {
        let index = sample();

        let near = index
            .closest("http://example.org/", ts("20060601000000"), 2)
            .unwrap();
        assert_eq!(timestamps(&near), vec!["20060101000000", "20070101000000"]);

        let exact = index
            .closest("http://example.org/", ts("20070101000000"), 1)
            .unwrap();
        assert_eq!(timestamps(&exact), vec!["20070101000000"]);

        let early = index
            .closest("http://example.org/", ts("19990101000000"), 3)
            .unwrap();
        assert_eq!(
            timestamps(&early),
            vec!["20050101000000", "20060101000000", "20070101000000"]
        );

        let late = index
            .closest("http://example.org/", ts("20200101000000"), 2)
            .unwrap();
        assert_eq!(timestamps(&late), vec!["20070101000000", "20080101000000"]);

        let everything = index
            .closest("http://example.org/", ts("20060601000000"), 10)
            .unwrap();
        assert_eq!(everything.len(), 4);

        assert!(index
            .closest("http://example.org/", ts("20060601000000"), 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_closest_tie_prefers_earlier() {
        let index = index_of(&[
            capture("http://example.org/", "20050101000000"),
            capture("http://example.org/", "20050101000010"),
        ]);
        let near = index
            .closest("http://example.org/", ts("20050101000005"), 1)
            .unwrap();
        assert_eq!(timestamps(&near), vec!["20050101000000"]);
    }

    #[test]
    fn test_closest_last_url_in_store() {
        let index = index_of(&[
            capture("http://example.net/", "20050101000000"),
            capture("http://example.org/", "20050101000000"),
            capture("http://example.org/", "20060101000000"),
        ]);
        let near = index
            .closest("http://example.org/", ts("20300101000000"), 1)
            .unwrap();
        assert_eq!(timestamps(&near), vec!["20060101000000"]);

        let both = index
            .closest("http://example.org/", ts("20300101000000"), 5)
            .unwrap();
        assert_eq!(timestamps(&both), vec!["20050101000000", "20060101000000"]);
        assert_eq!(index.store().stats().open_cursors(), 0);
    }

    #[test]
    fn test_closest_empty_store() {
        let index = index_of(&[]);
        assert!(index
            .closest("http://example.org/", ts("20050101000000"), 3)
            .unwrap()
            .is_empty());
    }
}
