//! Records persisted in the cache store.

use crate::error::{JsonLdError, Result};
use crate::types::JsonLdResponse;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-path record of the request headers responses vary on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreCacheRecord {
    /// Sorted, lower-case header names.
    pub headers: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// A stored response, valid while its timestamp is not older than the
/// pre-cache record of its path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "StoredValue", from = "StoredValue")]
pub struct ValueRecord {
    pub response: JsonLdResponse,
    pub timestamp: DateTime<Utc>,
}

/// Encoded form of a [`ValueRecord`]. UTF-8 bodies are kept as a JSON string.
#[derive(Serialize, Deserialize)]
struct StoredValue {
    status: u16,
    headers: BTreeMap<String, String>,
    body: StoredBody,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StoredBody {
    Text(String),
    Binary(Vec<u8>),
}

impl From<ValueRecord> for StoredValue {
    fn from(record: ValueRecord) -> Self {
        let JsonLdResponse {
            status,
            headers,
            body,
        } = record.response;
        let body = match std::str::from_utf8(&body) {
            Ok(text) => StoredBody::Text(text.to_string()),
            Err(_) => StoredBody::Binary(body.to_vec()),
        };
        StoredValue {
            status,
            headers,
            body,
            timestamp: record.timestamp,
        }
    }
}

impl From<StoredValue> for ValueRecord {
    fn from(stored: StoredValue) -> Self {
        let body = match stored.body {
            StoredBody::Text(text) => Bytes::from(text),
            StoredBody::Binary(raw) => Bytes::from(raw),
        };
        ValueRecord {
            response: JsonLdResponse {
                status: stored.status,
                headers: stored.headers,
                body,
            },
            timestamp: stored.timestamp,
        }
    }
}

pub(crate) fn encode<T: Serialize>(record: &T) -> Result<Bytes> {
    serde_json::to_vec(record)
        .map(Bytes::from)
        .map_err(|e| JsonLdError::Cache(format!("cannot encode cache record: {}", e)))
}

pub(crate) fn decode<T: DeserializeOwned>(key: &str, raw: &[u8]) -> Result<T> {
    serde_json::from_slice(raw)
        .map_err(|e| JsonLdError::Cache(format!("corrupt cache record {}: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_value_record_keeps_body() {
        let record = ValueRecord {
            response: JsonLdResponse::new(200, "[{\"id\":1}]").with_header("Vary", "Accept-Language"),
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        let raw = encode(&record).unwrap();
        let back: ValueRecord = decode("k", &raw).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.response.body_str(), Some("[{\"id\":1}]"));
    }

    #[test]
    fn test_text_body_is_stored_as_string() {
        let record = ValueRecord {
            response: JsonLdResponse::new(200, "[\"a\"]"),
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        let raw = encode(&record).unwrap();
        let stored: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(stored["body"], "[\"a\"]");
        assert_eq!(stored["status"], 200);
    }

    #[test]
    fn test_binary_body_round_trips() {
        let record = ValueRecord {
            response: JsonLdResponse::new(200, vec![0xff_u8, 0x00, 0xfe]),
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        let back: ValueRecord = decode("k", &encode(&record).unwrap()).unwrap();
        assert_eq!(back.response.body.as_ref(), &[0xff, 0x00, 0xfe]);
    }

    #[test]
    fn test_corrupt_record_is_cache_error() {
        let err = decode::<PreCacheRecord>("jsonld_letters", b"not json").unwrap_err();
        assert!(matches!(err, JsonLdError::Cache(ref msg) if msg.contains("jsonld_letters")));
    }
}
