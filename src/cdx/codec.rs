// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Record codecs.
//!
//! A codec turns a record into the `(key, value)` byte pair stored in an
//! ordered store and back. The key encoding must sort byte-wise in the order
//! records should be scanned.

use std::fmt;

use super::error::CodecError;
use super::record::CaptureRecord;

/// Converts records to and from stored key/value pairs.
pub trait RecordCodec: Send + Sync {
    /// The decoded record type.
    type Record;

    /// Encodes a record into its stored key and value.
    fn encode(&self, record: &Self::Record) -> Result<(Vec<u8>, Vec<u8>), CodecError>;

    /// Decodes a stored key and value.
    fn decode(&self, key: &[u8], value: &[u8]) -> Result<Self::Record, CodecError>;
}

/// Codec for [`CaptureRecord`]s stored as CDX text.
///
/// The key is `"{url_key} {timestamp}"`, the value the remaining CDX fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct CdxCodec;

impl RecordCodec for CdxCodec {
    type Record = CaptureRecord;

    fn encode(&self, record: &CaptureRecord) -> Result<(Vec<u8>, Vec<u8>), CodecError> {
        record.validate()?;
        Ok((record.key().into_bytes(), record.value().into_bytes()))
    }

    fn decode(&self, key: &[u8], value: &[u8]) -> Result<CaptureRecord, CodecError> {
        let key = std::str::from_utf8(key).map_err(|_| CodecError::NotUtf8("key"))?;
        let value = std::str::from_utf8(value).map_err(|_| CodecError::NotUtf8("value"))?;

        let mut key_fields = key.split(' ');
        let (Some(url_key), Some(timestamp), None) =
            (key_fields.next(), key_fields.next(), key_fields.next())
        else {
            return Err(CodecError::FieldCount {
                expected: "2 key",
                found: key.split(' ').count(),
            });
        };
        let payload: Vec<&str> = value.split(' ').collect();
        CaptureRecord::from_fields(url_key, timestamp, &payload)
    }
}

/// An undecoded stored pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RawRecord {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl RawRecord {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Renders as `"{key} {value}"`, replacing invalid UTF-8.
impl fmt::Display for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            String::from_utf8_lossy(&self.key),
            String::from_utf8_lossy(&self.value)
        )
    }
}

impl<K: Into<Vec<u8>>, V: Into<Vec<u8>>> From<(K, V)> for RawRecord {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// Identity codec over [`RawRecord`]s. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawCodec;

impl RecordCodec for RawCodec {
    type Record = RawRecord;

    fn encode(&self, record: &RawRecord) -> Result<(Vec<u8>, Vec<u8>), CodecError> {
        Ok((record.key.clone(), record.value.clone()))
    }

    fn decode(&self, key: &[u8], value: &[u8]) -> Result<RawRecord, CodecError> {
        Ok(RawRecord::new(key, value))
    }
}
