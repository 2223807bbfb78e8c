// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Capture records and capture timestamps.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use super::error::CodecError;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const TIMESTAMP_DIGITS: usize = 14;

/// Field layout of a CDX line: URL key, timestamp, original URL, media type,
/// status, digest, redirect, meta flags, compressed length, offset, file name.
pub const CDX_HEADER: &str = " CDX N b a m s k r M S V g";

/// Field layout of the older nine-field CDX line, without meta flags and
/// compressed length.
pub const LEGACY_CDX_HEADER: &str = " CDX N b a m s k r V g";

/// A capture time with second precision, written as 14 digits
/// (`YYYYMMDDhhmmss`).
///
/// The digit form sorts byte-wise in chronological order, which is what lets
/// it follow the URL key inside a record key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaptureTimestamp(NaiveDateTime);

impl CaptureTimestamp {
    /// Parses a full 14-digit timestamp.
    pub fn parse(digits: &str) -> Result<Self, CodecError> {
        if digits.len() != TIMESTAMP_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::InvalidTimestamp(digits.to_string()));
        }
        NaiveDateTime::parse_from_str(digits, TIMESTAMP_FORMAT)
            .map(Self)
            .map_err(|_| CodecError::InvalidTimestamp(digits.to_string()))
    }

    /// Expands a 4 to 14 digit prefix to the earliest instant it covers.
    ///
    /// `"2005"` becomes `20050101000000`.
    pub fn earliest(prefix: &str) -> Result<Self, CodecError> {
        Self::parse(&pad(prefix, "00000101000000")?)
    }

    /// Expands a 4 to 14 digit prefix to the latest instant it covers.
    ///
    /// `"200502"` becomes `20050228235959`.
    pub fn latest(prefix: &str) -> Result<Self, CodecError> {
        let padded = pad(prefix, "99991231235959")?;
        if let Ok(ts) = Self::parse(&padded) {
            return Ok(ts);
        }
        let invalid = || CodecError::InvalidTimestamp(prefix.to_string());
        // Only a padded day can overflow its month; an explicit one is an error.
        if prefix.len() > 6 {
            return Err(invalid());
        }
        let year: i32 = padded[0..4].parse().map_err(|_| invalid())?;
        let month: u32 = padded[4..6].parse().map_err(|_| invalid())?;
        let last_day = last_day_of_month(year, month).ok_or_else(invalid)?;
        Self::parse(&format!("{}{:02}{}", &padded[0..6], last_day, &padded[8..]))
    }

    /// Wraps a `NaiveDateTime`, dropping sub-second precision.
    pub fn from_datetime(at: NaiveDateTime) -> Self {
        Self(at.with_nanosecond(0).unwrap_or(at))
    }

    /// Returns the underlying date and time.
    #[inline]
    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    /// Absolute distance to `other` in seconds.
    pub fn seconds_between(&self, other: &CaptureTimestamp) -> u64 {
        (self.0 - other.0).num_seconds().unsigned_abs()
    }
}

fn pad(prefix: &str, template: &str) -> Result<String, CodecError> {
    if !(4..=TIMESTAMP_DIGITS).contains(&prefix.len()) || !prefix.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(CodecError::InvalidTimestamp(prefix.to_string()));
    }
    let mut padded = String::with_capacity(TIMESTAMP_DIGITS);
    padded.push_str(prefix);
    padded.push_str(&template[prefix.len()..]);
    Ok(padded)
}

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    next.pred_opt().map(|d| d.day())
}

impl fmt::Display for CaptureTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for CaptureTimestamp {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Metadata for one web capture.
///
/// The record key is `"{url_key} {timestamp}"`; every other field is value
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRecord {
    /// Canonical URL key (see [`url_key`](super::url_key)).
    pub url_key: String,
    pub timestamp: CaptureTimestamp,
    /// URL as it was requested by the crawler.
    pub original_url: String,
    pub mime_type: String,
    /// HTTP status, `None` for non-HTTP captures.
    pub status: Option<u16>,
    /// Content digest of the payload.
    pub digest: String,
    /// Redirect target, if the capture was a redirect.
    pub redirect: Option<String>,
    /// Robot meta flags (`A`, `F`, `I` combinations).
    pub meta_flags: Option<String>,
    /// Compressed record length inside the archive file.
    pub length: Option<u64>,
    /// Compressed record offset inside the archive file.
    pub offset: u64,
    /// Archive file holding the capture.
    pub filename: String,
}

impl CaptureRecord {
    /// Renders the stored key, `"{url_key} {timestamp}"`.
    pub fn key(&self) -> String {
        format!("{} {}", self.url_key, self.timestamp)
    }

    /// Renders the stored value, the nine payload fields separated by spaces.
    pub fn value(&self) -> String {
        format!(
            "{} {} {} {} {} {} {} {} {}",
            self.original_url,
            self.mime_type,
            opt(self.status),
            self.digest,
            self.redirect.as_deref().unwrap_or("-"),
            self.meta_flags.as_deref().unwrap_or("-"),
            opt(self.length),
            self.offset,
            self.filename,
        )
    }

    /// Renders a full CDX line in [`CDX_HEADER`] layout.
    pub fn to_cdx_line(&self) -> String {
        format!("{} {}", self.key(), self.value())
    }

    /// Parses a CDX line in [`CDX_HEADER`] or [`LEGACY_CDX_HEADER`] layout.
    pub fn from_cdx_line(line: &str) -> Result<Self, CodecError> {
        let fields: Vec<&str> = line.split_ascii_whitespace().collect();
        if fields.len() < 2 {
            return Err(CodecError::FieldCount {
                expected: "9 or 11",
                found: fields.len(),
            });
        }
        Self::from_fields(fields[0], fields[1], &fields[2..])
    }

    /// Builds a record from the two key fields and the payload fields.
    pub(crate) fn from_fields(
        url_key: &str,
        timestamp: &str,
        payload: &[&str],
    ) -> Result<Self, CodecError> {
        let (original_url, mime_type, status, digest, redirect, meta_flags, length, offset, filename) =
            match *payload {
                [a, m, s, k, r, meta, len, off, g] => (a, m, s, k, r, Some(meta), Some(len), off, g),
                [a, m, s, k, r, off, g] => (a, m, s, k, r, None, None, off, g),
                _ => {
                    return Err(CodecError::FieldCount {
                        expected: "9 or 11",
                        found: payload.len() + 2,
                    })
                }
            };

        Ok(Self {
            url_key: required("url key", url_key)?,
            timestamp: CaptureTimestamp::parse(timestamp)?,
            original_url: required("original url", original_url)?,
            mime_type: required("mime type", mime_type)?,
            status: parse_opt("status", status)?,
            digest: required("digest", digest)?,
            redirect: dash_to_none(redirect),
            meta_flags: meta_flags.and_then(dash_to_none),
            length: match length {
                Some(len) => parse_opt("length", len)?,
                None => None,
            },
            offset: parse_num("offset", offset)?,
            filename: required("filename", filename)?,
        })
    }

    /// Checks that every text field can be written into a CDX line.
    pub fn validate(&self) -> Result<(), CodecError> {
        let text = [
            ("url key", Some(self.url_key.as_str())),
            ("original url", Some(self.original_url.as_str())),
            ("mime type", Some(self.mime_type.as_str())),
            ("digest", Some(self.digest.as_str())),
            ("redirect", self.redirect.as_deref()),
            ("meta flags", self.meta_flags.as_deref()),
            ("filename", Some(self.filename.as_str())),
        ];
        for (field, value) in text {
            let Some(value) = value else { continue };
            if value.is_empty() {
                return Err(CodecError::EmptyField(field));
            }
            if value.chars().any(char::is_whitespace) {
                return Err(CodecError::Whitespace {
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn opt<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn required(field: &'static str, value: &str) -> Result<String, CodecError> {
    if value.is_empty() {
        return Err(CodecError::EmptyField(field));
    }
    Ok(value.to_string())
}

fn dash_to_none(value: &str) -> Option<String> {
    (value != "-").then(|| value.to_string())
}

fn parse_num<T: FromStr>(field: &'static str, value: &str) -> Result<T, CodecError> {
    value.parse().map_err(|_| CodecError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_opt<T: FromStr>(field: &'static str, value: &str) -> Result<Option<T>, CodecError> {
    if value == "-" {
        return Ok(None);
    }
    parse_num(field, value).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "example.org/ 20050614120000 http://www.example.org/ text/html 200 \
                        3I42H3S6NNFQ2MSVX7XZKYAYSCX5QBYJ - - 2201 1043 IA-2005-001.arc.gz";

    #[test]
    fn test_timestamp_parse() {
        let ts = CaptureTimestamp::parse("20050614120000").unwrap();
        assert_eq!(ts.to_string(), "20050614120000");
        assert!(CaptureTimestamp::parse("2005061412000").is_err());
        assert!(CaptureTimestamp::parse("20051314120000").is_err());
        assert!(CaptureTimestamp::parse("2005061412000x").is_err());
    }

    #[test]
    fn test_timestamp_order_matches_digits() {
        let a = CaptureTimestamp::parse("19991231235959").unwrap();
        let b = CaptureTimestamp::parse("20000101000000").unwrap();
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
        assert_eq!(a.seconds_between(&b), 1);
        assert_eq!(b.seconds_between(&a), 1);
    }

    #[test]
    fn test_timestamp_padding() {
        assert_eq!(CaptureTimestamp::earliest("2005").unwrap().to_string(), "20050101000000");
        assert_eq!(CaptureTimestamp::latest("2005").unwrap().to_string(), "20051231235959");
        assert_eq!(CaptureTimestamp::latest("200502").unwrap().to_string(), "20050228235959");
        assert_eq!(CaptureTimestamp::latest("200402").unwrap().to_string(), "20040229235959");
        assert_eq!(CaptureTimestamp::latest("20040210").unwrap().to_string(), "20040210235959");
        assert!(CaptureTimestamp::earliest("200").is_err());
        assert!(CaptureTimestamp::latest("20040231").is_err());
    }

    #[test]
    fn test_parse_line() {
        let record = CaptureRecord::from_cdx_line(LINE).unwrap();
        assert_eq!(record.url_key, "example.org/");
        assert_eq!(record.timestamp.to_string(), "20050614120000");
        assert_eq!(record.original_url, "http://www.example.org/");
        assert_eq!(record.mime_type, "text/html");
        assert_eq!(record.status, Some(200));
        assert_eq!(record.redirect, None);
        assert_eq!(record.meta_flags, None);
        assert_eq!(record.length, Some(2201));
        assert_eq!(record.offset, 1043);
        assert_eq!(record.filename, "IA-2005-001.arc.gz");
        assert_eq!(record.to_cdx_line(), LINE);
    }

    #[test]
    fn test_parse_legacy_line() {
        let record = CaptureRecord::from_cdx_line(
            "example.org/ 20050614120000 http://example.org/ text/html - abc http://example.org/x 77 a.arc",
        )
        .unwrap();
        assert_eq!(record.status, None);
        assert_eq!(record.redirect.as_deref(), Some("http://example.org/x"));
        assert_eq!(record.length, None);
        assert_eq!(record.offset, 77);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            CaptureRecord::from_cdx_line("example.org/ 20050614120000 x"),
            Err(CodecError::FieldCount { found: 3, .. })
        ));
        assert!(matches!(
            CaptureRecord::from_cdx_line(&LINE.replace(" 1043 ", " 10x3 ")),
            Err(CodecError::InvalidNumber { field: "offset", .. })
        ));
        assert!(matches!(
            CaptureRecord::from_cdx_line(&LINE.replace("20050614120000", "2005")),
            Err(CodecError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_validate() {
        let mut record = CaptureRecord::from_cdx_line(LINE).unwrap();
        assert!(record.validate().is_ok());

        record.mime_type = "text/html; charset=utf-8".to_string();
        assert!(matches!(record.validate(), Err(CodecError::Whitespace { field: "mime type", .. })));

        record.mime_type = String::new();
        assert_eq!(record.validate(), Err(CodecError::EmptyField("mime type")));
    }
}
