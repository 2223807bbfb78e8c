// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! The three-way filter protocol and the stock filters.

use crate::cdx::{url_key, CaptureRecord, CaptureTimestamp};

use super::Direction;

/// Ruling of a filter on one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterDecision {
    /// Keep the record and continue.
    Include,
    /// Drop the record and continue.
    Exclude,
    /// Drop the record and stop the scan.
    Abort,
}

/// A per-record decision function steering a scan.
///
/// Filters may keep state between calls (counters, targets) but see each
/// record exactly once, in the order the scan visits them. A filter whose
/// ruling depends on the scan direction takes it at construction.
///
/// Any `FnMut(&R) -> FilterDecision` closure is a filter.
pub trait Filter<R> {
    /// Rules on one record.
    fn decide(&mut self, record: &R) -> FilterDecision;
}

impl<R, F> Filter<R> for F
where
    F: FnMut(&R) -> FilterDecision,
{
    #[inline]
    fn decide(&mut self, record: &R) -> FilterDecision {
        self(record)
    }
}

/// Includes every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct IncludeAll;

impl<R> Filter<R> for IncludeAll {
    #[inline]
    fn decide(&mut self, _: &R) -> FilterDecision {
        FilterDecision::Include
    }
}

/// Excludes every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExcludeAll;

impl<R> Filter<R> for ExcludeAll {
    #[inline]
    fn decide(&mut self, _: &R) -> FilterDecision {
        FilterDecision::Exclude
    }
}

/// Caps the number of included records.
///
/// Passes rulings of the wrapped filter through and aborts on the first
/// record visited after `limit` records were included.
#[derive(Debug, Clone)]
pub struct Limit<F> {
    inner: F,
    limit: usize,
    included: usize,
}

impl<F> Limit<F> {
    pub fn new(inner: F, limit: usize) -> Self {
        Self {
            inner,
            limit,
            included: 0,
        }
    }

    /// Number of records included so far.
    pub fn included(&self) -> usize {
        self.included
    }
}

impl<R, F: Filter<R>> Filter<R> for Limit<F> {
    fn decide(&mut self, record: &R) -> FilterDecision {
        if self.included >= self.limit {
            return FilterDecision::Abort;
        }
        let decision = self.inner.decide(record);
        if decision == FilterDecision::Include {
            self.included += 1;
        }
        decision
    }
}

/// An ordered group of filters.
///
/// Filters run in insertion order and the first non-`Include` ruling wins,
/// so later filters never see records an earlier one excluded. Put filters
/// that abort first and filters that count last.
pub struct FilterChain<'a, R> {
    filters: Vec<Box<dyn Filter<R> + 'a>>,
}

impl<'a, R> FilterChain<'a, R> {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Appends a filter.
    pub fn push(&mut self, filter: impl Filter<R> + 'a) {
        self.filters.push(Box::new(filter));
    }

    /// Appends a filter, builder style.
    pub fn with(mut self, filter: impl Filter<R> + 'a) -> Self {
        self.push(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<R> Default for FilterChain<'_, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Filter<R> for FilterChain<'_, R> {
    fn decide(&mut self, record: &R) -> FilterDecision {
        for filter in &mut self.filters {
            match filter.decide(record) {
                FilterDecision::Include => continue,
                ruling => return ruling,
            }
        }
        FilterDecision::Include
    }
}

/// Matches captures of one URL, or of every URL under a prefix.
///
/// Matching URL keys are contiguous in the key space, so the first record
/// outside the match ends the scan in either direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatch {
    key: String,
    prefix: bool,
}

impl UrlMatch {
    /// Matches captures whose URL key equals the key of `url`.
    pub fn exact(url: &str) -> Self {
        Self {
            key: url_key(url),
            prefix: false,
        }
    }

    /// Matches captures whose URL key starts with the key of `url`.
    pub fn prefix(url: &str) -> Self {
        Self {
            key: url_key(url),
            prefix: true,
        }
    }

    /// The canonical URL key being matched.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns true if `url_key` is inside the match.
    pub fn matches(&self, url_key: &str) -> bool {
        if self.prefix {
            url_key.starts_with(&self.key)
        } else {
            url_key == self.key
        }
    }
}

impl Filter<CaptureRecord> for UrlMatch {
    fn decide(&mut self, record: &CaptureRecord) -> FilterDecision {
        if self.matches(&record.url_key) {
            FilterDecision::Include
        } else {
            FilterDecision::Abort
        }
    }
}

/// Keeps captures inside an inclusive time window.
///
/// By default records outside the window are excluded. On a single-URL scan
/// timestamps are monotonic, so [`DateRange::aborting`] can stop the scan at
/// the first record past the far edge of the window instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    from: CaptureTimestamp,
    to: CaptureTimestamp,
    abort_past: Option<Direction>,
}

impl DateRange {
    pub fn new(from: CaptureTimestamp, to: CaptureTimestamp) -> Self {
        Self {
            from,
            to,
            abort_past: None,
        }
    }

    /// Aborts on the first record beyond the window edge `direction` walks
    /// towards.
    pub fn aborting(mut self, direction: Direction) -> Self {
        self.abort_past = Some(direction);
        self
    }
}

impl Filter<CaptureRecord> for DateRange {
    fn decide(&mut self, record: &CaptureRecord) -> FilterDecision {
        let ts = record.timestamp;
        let beyond = match self.abort_past {
            Some(Direction::Forward) => ts > self.to,
            Some(Direction::Backward) => ts < self.from,
            None => false,
        };
        if beyond {
            FilterDecision::Abort
        } else if ts < self.from || ts > self.to {
            FilterDecision::Exclude
        } else {
            FilterDecision::Include
        }
    }
}

/// Keeps captures whose payload fields match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMatch {
    /// HTTP status equals the given code.
    Status(u16),
    /// Media type equals the given type, ignoring ASCII case.
    MimeType(String),
    /// Capture was not a redirect.
    NotRedirect,
}

impl Filter<CaptureRecord> for FieldMatch {
    fn decide(&mut self, record: &CaptureRecord) -> FilterDecision {
        let matched = match self {
            FieldMatch::Status(code) => record.status == Some(*code),
            FieldMatch::MimeType(mime) => record.mime_type.eq_ignore_ascii_case(mime),
            FieldMatch::NotRedirect => record.redirect.is_none(),
        };
        if matched {
            FilterDecision::Include
        } else {
            FilterDecision::Exclude
        }
    }
}
