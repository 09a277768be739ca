//! HTTP response as seen by the client and stored by the cache.

use crate::types::find_header;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// HTTP response with a fully materialized body.
///
/// The body is an immutable [`Bytes`] buffer, so a response can be replayed
/// from the cache any number of times and every reader starts at offset 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonLdResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl JsonLdResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        JsonLdResponse {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `true` for the canonical empty collection literal, `[]` with or
    /// without a trailing newline.
    #[inline]
    pub fn is_empty_collection(&self) -> bool {
        self.body.as_ref() == b"[]" || self.body.as_ref() == b"[]\n"
    }
}

impl Default for JsonLdResponse {
    fn default() -> Self {
        JsonLdResponse::new(200, Bytes::new())
    }
}
