//! The `Range` request header.
//!
//! Format: `<unit>=<start>-<end>`, where the end is optional when parsing.
//!
//! ```
//! use jsonld_client::protocol::Range;
//!
//! let range = Range::new("letters", 20, 29);
//! assert_eq!(range.to_header_value(), "letters=20-29");
//!
//! let open = Range::from_header_value("bytes=10-").unwrap();
//! assert_eq!((open.start, open.end), (10, 0));
//! ```

use crate::error::{JsonLdError, Result};
use crate::protocol::DEFAULT_UNIT;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

static RANGE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)=(\d+)-(\d+)?$").unwrap());

/// A `Range` request header value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    pub unit: String,
    pub start: u64,
    pub end: u64,
}

impl Range {
    /// Create a range; an empty unit falls back to `bytes`.
    #[must_use]
    pub fn new(unit: impl Into<String>, start: u64, end: u64) -> Self {
        let unit = unit.into();
        Range {
            unit: if unit.is_empty() {
                DEFAULT_UNIT.to_string()
            } else {
                unit
            },
            start,
            end,
        }
    }

    #[must_use]
    pub fn to_header_value(&self) -> String {
        self.to_string()
    }

    /// Parse `unit=start-end`; a missing end parses as `0`.
    pub fn from_header_value(value: &str) -> Result<Self> {
        let caps = RANGE_REGEX
            .captures(value)
            .ok_or_else(|| JsonLdError::Parse(format!("invalid range {}", value)))?;

        let number = |idx: usize| -> Result<u64> {
            caps.get(idx)
                .map(|m| m.as_str().parse::<u64>())
                .transpose()
                .map(Option::unwrap_or_default)
                .map_err(|e| JsonLdError::Parse(format!("invalid range {}: {}", value, e)))
        };

        Ok(Range::new(&caps[1], number(2)?, number(3)?))
    }
}

impl Default for Range {
    fn default() -> Self {
        Range::new(DEFAULT_UNIT, 0, 0)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}-{}", self.unit, self.start, self.end)
    }
}

impl FromStr for Range {
    type Err = JsonLdError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_header_value(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_closed_range() {
        let range = Range::from_header_value("bytes=0-1023").unwrap();
        assert_eq!(range, Range::new("bytes", 0, 1023));
    }

    #[test]
    fn test_parse_open_range() {
        let range = Range::from_header_value("bytes=10-").unwrap();
        assert_eq!(range, Range::new("bytes", 10, 0));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            Range::from_header_value("bytes 0-10"),
            Err(JsonLdError::Parse(_))
        ));
        assert!(Range::from_header_value("=0-10").is_err());
        assert!(Range::from_header_value("bytes=-10").is_err());
        assert!(Range::from_header_value("").is_err());
    }

    #[test]
    fn test_parse_overflow_is_error() {
        assert!(Range::from_header_value("bytes=0-99999999999999999999999").is_err());
    }

    #[test]
    fn test_empty_unit_defaults_to_bytes() {
        assert_eq!(Range::new("", 1, 2).to_header_value(), "bytes=1-2");
    }

    #[test]
    fn test_round_trip() {
        let samples = [
            ("letters", 0, 0),
            ("letters", 20, 29),
            ("items", 1, u64::MAX),
            ("bytes", u64::MAX, 0),
        ];
        for (unit, start, end) in samples {
            let range = Range::new(unit, start, end);
            let parsed: Range = range.to_header_value().parse().unwrap();
            assert_eq!(parsed, range);
        }
    }
}
