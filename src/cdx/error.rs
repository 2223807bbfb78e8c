// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Codec error types.

/// Errors raised while converting records to or from stored key/value pairs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: &'static str, found: usize },

    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),

    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{0} is not valid utf-8")]
    NotUtf8(&'static str),

    #[error("empty {0}")]
    EmptyField(&'static str),

    #[error("{field} contains whitespace: {value:?}")]
    Whitespace { field: &'static str, value: String },
}
