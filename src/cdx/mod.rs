// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Capture records and their stored encoding.
//!
//! A capture is stored as one key/value pair of CDX text. The key is the
//! canonical URL key followed by the 14-digit timestamp, so every capture of
//! a URL is contiguous in the key space and ordered by time:
//!
//! ```text
//! key:   example.org/ 20050614120000
//! value: http://example.org/ text/html 200 3I42H3S6... - - 2201 1043 IA-2005-001.arc.gz
//! ```

mod codec;
mod error;
mod record;
mod url;

pub use codec::{CdxCodec, RawCodec, RawRecord, RecordCodec};
pub use error::CodecError;
pub use record::{CaptureRecord, CaptureTimestamp, CDX_HEADER, LEGACY_CDX_HEADER};
pub use url::url_key;
