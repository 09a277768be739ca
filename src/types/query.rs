//! Scalar query parameter values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Query parameters, ordered by key so identical parameter sets always
/// produce identical query strings.
pub type QueryParams = BTreeMap<String, QueryValue>;

/// A scalar query string value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl QueryValue {
    /// Interpret the value as a non-negative integer.
    ///
    /// Strings are trimmed before parsing; booleans never qualify.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            QueryValue::Int(n) => u64::try_from(*n).ok(),
            QueryValue::Str(s) => s.trim().parse().ok(),
            QueryValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Int(n) => write!(f, "{}", n),
            QueryValue::Bool(b) => write!(f, "{}", b),
            QueryValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<usize> for QueryValue {
    fn from(value: usize) -> Self {
        QueryValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_u64() {
        assert_eq!(QueryValue::from(20).as_u64(), Some(20));
        assert_eq!(QueryValue::from(" 15 ").as_u64(), Some(15));
        assert_eq!(QueryValue::from(-1).as_u64(), None);
        assert_eq!(QueryValue::from("ten").as_u64(), None);
        assert_eq!(QueryValue::from(true).as_u64(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(QueryValue::from(10).to_string(), "10");
        assert_eq!(QueryValue::from("Academic").to_string(), "Academic");
        assert_eq!(QueryValue::from(false).to_string(), "false");
    }

    #[test]
    fn test_untagged_deserialize() {
        let values: Vec<QueryValue> = serde_json::from_str(r#"[1, true, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![QueryValue::Int(1), QueryValue::Bool(true), QueryValue::Str("x".into())]
        );
    }
}
