//! Outgoing request representation.

use crate::error::{JsonLdError, Result};
use crate::types::{find_header, QueryParams, QueryValue};
use bytes::Bytes;
use std::collections::BTreeMap;
use url::Url;

/// A request as it travels through the stage pipeline to the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonLdRequest {
    /// Upper-case HTTP method.
    pub method: String,
    /// Target URL without the query parameters held in `query`.
    pub url: String,
    pub query: QueryParams,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl JsonLdRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        JsonLdRequest {
            method: method.into().to_uppercase(),
            url: url.into(),
            query: QueryParams::new(),
            headers: BTreeMap::new(),
            body: Bytes::new(),
        }
    }

    #[inline]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Path component of the target URL.
    pub fn path(&self) -> String {
        match Url::parse(&self.url) {
            Ok(url) => url.path().to_string(),
            Err(_) => self
                .url
                .split(&['?', '#'][..])
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Encoded query string: any query already on the URL followed by `query`.
    pub fn query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.query {
            serializer.append_pair(name, &value.to_string());
        }
        let encoded = serializer.finish();

        let existing = self
            .url
            .split_once('?')
            .map(|(_, q)| q.split('#').next().unwrap_or_default())
            .unwrap_or_default();

        match (existing.is_empty(), encoded.is_empty()) {
            (true, _) => encoded,
            (false, true) => existing.to_string(),
            (false, false) => format!("{}&{}", existing, encoded),
        }
    }

    /// The URL actually sent on the wire, query included.
    pub fn full_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| JsonLdError::Config(format!("Invalid url {}: {}", self.url, e)))?;
        let query = self.query_string();
        url.set_query(if query.is_empty() { None } else { Some(&query) });
        Ok(url)
    }
}
