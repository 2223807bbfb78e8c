// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Result sinks.

use std::collections::{vec_deque, VecDeque};

use super::Direction;

/// Receives the records a scan includes.
pub trait Sink<R> {
    /// Takes one included record, tagged with the direction it was found in.
    fn accept(&mut self, record: R, direction: Direction);
}

/// Collects included records in ascending key order.
///
/// Forward matches are appended at the tail, backward matches are pushed at
/// the head, so the sequence stays ascending whichever way the scan walked.
/// Records are never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSink<R> {
    records: VecDeque<R>,
}

impl<R> ResultSink<R> {
    pub fn new() -> Self {
        Self {
            records: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Smallest record collected so far.
    pub fn first(&self) -> Option<&R> {
        self.records.front()
    }

    /// Largest record collected so far.
    pub fn last(&self) -> Option<&R> {
        self.records.back()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, R> {
        self.records.iter()
    }

    pub fn into_vec(self) -> Vec<R> {
        self.records.into()
    }
}

impl<R> Default for ResultSink<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Sink<R> for ResultSink<R> {
    fn accept(&mut self, record: R, direction: Direction) {
        match direction {
            Direction::Forward => self.records.push_back(record),
            Direction::Backward => self.records.push_front(record),
        }
    }
}

impl<R> IntoIterator for ResultSink<R> {
    type Item = R;
    type IntoIter = vec_deque::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a ResultSink<R> {
    type Item = &'a R;
    type IntoIter = vec_deque::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
