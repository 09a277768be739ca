use crate::error::Result;
use crate::types::{JsonLdRequest, JsonLdResponse};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Abstraction for network operations.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Perform one HTTP exchange.
    ///
    /// Any status code is a successful exchange; only failures to obtain a
    /// response are errors. The returned body is fully materialized.
    async fn fetch(&self, request: JsonLdRequest) -> Result<JsonLdResponse>;
}

/// Abstraction for the response cache backend.
///
/// Implementations are expected to make single `get`/`set` calls atomic.
/// Errors are surfaced to the caller as-is.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Retrieve a value, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Store a value for `ttl`.
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()>;

    /// Delete a value. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Source of cache timestamps.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
