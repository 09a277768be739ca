//! The `Content-Range` response header.
//!
//! Servers paginating by range answer with the slice they returned and the
//! total size of the collection:
//!
//! ```text
//! Content-Range: letters 0-9/60
//! Content-Range: letters 10-19/*
//! Content-Range: letters */60
//! ```
//!
//! | State | Formatted as |
//! |-------|--------------|
//! | `size == 0` or `end == 0` | `<unit> */<size>` |
//! | `size == -1` (unknown total) | `<unit> <start>-<end>/*` |
//! | otherwise | `<unit> <start>-<end>/<size>` |
//!
//! # Examples
//!
//! ```
//! use jsonld_client::protocol::ContentRange;
//!
//! let range = ContentRange::from_header_value("letters 0-9/60").unwrap();
//! assert_eq!(range.size, 60);
//!
//! // A wildcard range resolves against the known size.
//! let range = ContentRange::from_header_value("bytes */100").unwrap();
//! assert_eq!((range.start, range.end), (0, 99));
//!
//! // Without a size nothing can be recovered.
//! assert!(ContentRange::from_header_value("bytes */*").is_err());
//! ```

use crate::error::{JsonLdError, Result};
use crate::protocol::DEFAULT_UNIT;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

static CONTENT_RANGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)\s+(?:(\d+)-(\d+)|(\*))/(\d+|\*)$").unwrap());

/// Sentinel size for an unknown total.
pub const UNKNOWN_SIZE: i64 = -1;

/// A `Content-Range` header value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentRange {
    pub unit: String,
    pub start: i64,
    pub end: i64,
    /// Total size of the resource, or [`UNKNOWN_SIZE`].
    pub size: i64,
}

impl ContentRange {
    /// Create a content range; an empty unit falls back to `bytes`.
    #[must_use]
    pub fn new(unit: impl Into<String>, start: i64, end: i64, size: i64) -> Self {
        let unit = unit.into();
        ContentRange {
            unit: if unit.is_empty() {
                DEFAULT_UNIT.to_string()
            } else {
                unit
            },
            start,
            end,
            size,
        }
    }

    /// Total size when the server reported one.
    #[must_use]
    pub fn known_size(&self) -> Option<u64> {
        u64::try_from(self.size).ok()
    }

    #[must_use]
    pub fn to_header_value(&self) -> String {
        self.to_string()
    }

    pub fn from_header_value(value: &str) -> Result<Self> {
        let caps = CONTENT_RANGE_REGEX.captures(value).ok_or_else(|| {
            JsonLdError::Parse(format!("cannot parse content range header: {}", value))
        })?;

        let wildcard_range = caps.get(4).is_some();
        if &caps[5] == "*" {
            let reason = if wildcard_range {
                "no size or range"
            } else {
                "no content range size"
            };
            return Err(JsonLdError::Parse(reason.to_string()));
        }

        let number = |idx: usize| -> Result<i64> {
            caps.get(idx)
                .map(|m| m.as_str().parse::<i64>())
                .transpose()
                .map(Option::unwrap_or_default)
                .map_err(|e| JsonLdError::Parse(format!("invalid content range {}: {}", value, e)))
        };

        let size = number(5)?;
        let start = number(2)?;
        // Ranges are inclusive, so a wildcard covers 0..=size-1.
        let end = if wildcard_range { size - 1 } else { number(3)? };

        Ok(ContentRange::new(&caps[1], start, end, size))
    }
}

impl Default for ContentRange {
    fn default() -> Self {
        ContentRange::new(DEFAULT_UNIT, 0, 0, 0)
    }
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.size == 0 || self.end == 0 {
            return write!(f, "{} */{}", self.unit, self.size);
        }
        if self.size == UNKNOWN_SIZE {
            return write!(f, "{} {}-{}/*", self.unit, self.start, self.end);
        }
        write!(f, "{} {}-{}/{}", self.unit, self.start, self.end, self.size)
    }
}

impl FromStr for ContentRange {
    type Err = JsonLdError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_header_value(s)
    }
}
