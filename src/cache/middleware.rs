//! Conditional response cache stage.
//!
//! The stage answers repeated `GET` requests from a [`CacheStore`] and drops
//! the stored view of a path whenever an unsafe method reaches it.
//!
//! # Records
//!
//! Each path has one pre-cache record listing the request headers named by
//! the last response's `Vary` header, and one value record per distinct
//! combination of query string and varying header values. A value record is
//! served only while it is not older than the pre-cache record, so rewriting
//! or deleting the pre-cache record invalidates every variant at once.
//!
//! # Methods
//!
//! | Method | `use_cache` | Behavior |
//! |--------|-------------|----------|
//! | `GET` | `true` | Lookup, on a miss forward and store 2xx responses |
//! | `GET` | `false` | Forward untouched |
//! | `HEAD`, `OPTIONS`, `TRACE` | any | Forward untouched |
//! | anything else | any | Forward, then delete the pre-cache record |

use super::keys;
use super::records::{decode, encode, PreCacheRecord, ValueRecord};
use crate::client::stack::{Next, RequestOptions, Stage};
use crate::error::Result;
use crate::protocol::headers;
use crate::traits::{CacheStore, Clock, SystemClock};
use crate::types::{JsonLdRequest, JsonLdResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Lifetime of records written by the stage.
pub const DEFAULT_TTL: Duration = Duration::from_secs(1800);

const CACHEABLE_METHODS: &[&str] = &["GET"];
const SAFE_METHODS: &[&str] = &["GET", "HEAD", "OPTIONS", "TRACE"];

pub fn is_cacheable_method(method: &str) -> bool {
    CACHEABLE_METHODS.iter().any(|m| m.eq_ignore_ascii_case(method))
}

pub fn is_safe_method(method: &str) -> bool {
    SAFE_METHODS.iter().any(|m| m.eq_ignore_ascii_case(method))
}

/// Header names from a `Vary` value: trimmed, lower-cased, sorted and
/// deduplicated.
pub fn parse_vary(value: Option<&str>) -> Vec<String> {
    let mut names: Vec<String> = value
        .unwrap_or_default()
        .split(',')
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// What the cache needs to know about a request once it has been forwarded.
struct CacheTarget {
    path: String,
    query: String,
    headers: BTreeMap<String, String>,
}

impl CacheTarget {
    fn of(request: &JsonLdRequest) -> Self {
        CacheTarget {
            path: request.path(),
            query: request.query_string(),
            headers: request.headers.clone(),
        }
    }

    fn pre_cache_key(&self) -> String {
        keys::pre_cache_key(&self.path)
    }

    fn value_key(&self, vary: &[String]) -> String {
        let values: Vec<&str> = vary
            .iter()
            .map(|name| crate::types::find_header(&self.headers, name).unwrap_or_default())
            .collect();
        keys::value_key(&self.path, &self.query, &values)
    }
}

/// Cache stage over any [`CacheStore`].
pub struct CacheStage {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl CacheStage {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        CacheStage {
            store,
            clock: Arc::new(SystemClock),
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop the pre-cache record of `path`, invalidating all its variants.
    pub async fn invalidate(&self, path: &str) -> Result<()> {
        let key = keys::pre_cache_key(path);
        tracing::debug!("Invalidating cached views of {}", key);
        self.store.delete(&key).await
    }

    async fn read_pre_cache(&self, key: &str) -> Result<Option<PreCacheRecord>> {
        match self.store.get(key).await? {
            Some(raw) => decode(key, &raw).map(Some),
            None => Ok(None),
        }
    }

    async fn lookup(&self, target: &CacheTarget) -> Result<Option<JsonLdResponse>> {
        let pre_key = target.pre_cache_key();
        let (vary, since): (Vec<String>, DateTime<Utc>) = match self.read_pre_cache(&pre_key).await? {
            Some(record) => (record.headers, record.timestamp),
            None => (Vec::new(), self.clock.now()),
        };

        let value_key = target.value_key(&vary);
        let Some(raw) = self.store.get(&value_key).await? else {
            return Ok(None);
        };
        let record: ValueRecord = decode(&value_key, &raw)?;
        if record.timestamp < since {
            tracing::debug!("Stale cache entry {}", value_key);
            return Ok(None);
        }
        Ok(Some(record.response))
    }

    async fn store_response(&self, target: &CacheTarget, response: &JsonLdResponse) -> Result<()> {
        let vary = parse_vary(response.header(headers::VARY));
        let pre_key = target.pre_cache_key();

        let unchanged = self
            .read_pre_cache(&pre_key)
            .await?
            .is_some_and(|record| record.headers == vary);
        if !unchanged {
            let record = PreCacheRecord {
                headers: vary.clone(),
                timestamp: self.clock.now(),
            };
            self.store.set(&pre_key, encode(&record)?, self.ttl).await?;
        }

        let record = ValueRecord {
            response: response.clone(),
            timestamp: self.clock.now(),
        };
        let value_key = target.value_key(&vary);
        tracing::debug!("Caching response under {}", value_key);
        self.store.set(&value_key, encode(&record)?, self.ttl).await
    }
}

#[async_trait]
impl Stage for CacheStage {
    fn name(&self) -> &'static str {
        "cache"
    }

    async fn handle(
        &self,
        request: JsonLdRequest,
        options: RequestOptions,
        next: Next<'_>,
    ) -> Result<JsonLdResponse> {
        if !is_safe_method(&request.method) {
            let path = request.path();
            let response = next.run(request, options).await?;
            self.invalidate(&path).await?;
            return Ok(response);
        }

        if !options.use_cache || !is_cacheable_method(&request.method) {
            return next.run(request, options).await;
        }

        let target = CacheTarget::of(&request);
        if let Some(cached) = self.lookup(&target).await? {
            tracing::debug!("Cache hit for {}", target.path);
            return Ok(cached);
        }

        let response = next.run(request, options).await?;
        if response.is_success() {
            self.store_response(&target, &response).await?;
        }
        Ok(response)
    }
}

impl std::fmt::Debug for CacheStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStage").field("ttl", &self.ttl).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::client::stack::StageStack;
    use crate::error::JsonLdError;
    use crate::traits::Transport;
    use bytes::Bytes;
    use chrono::TimeZone;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers every request with a body naming the call number.
    struct Counting {
        calls: AtomicUsize,
        vary: Mutex<Option<&'static str>>,
        status: u16,
    }

    impl Counting {
        fn new(vary: Option<&'static str>) -> Arc<Self> {
            Arc::new(Counting {
                calls: AtomicUsize::new(0),
                vary: Mutex::new(vary),
                status: 200,
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Counting {
                calls: AtomicUsize::new(0),
                vary: Mutex::new(None),
                status,
            })
        }

        fn set_vary(&self, vary: Option<&'static str>) {
            *self.vary.lock() = vary;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for Counting {
        async fn fetch(&self, _request: JsonLdRequest) -> Result<JsonLdResponse> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let mut response = JsonLdResponse::new(self.status, format!("[{}]", n));
            if let Some(vary) = *self.vary.lock() {
                response = response.with_header("Vary", vary);
            }
            Ok(response)
        }
    }

    /// Advances one second per reading.
    struct StepClock(Mutex<i64>);

    impl StepClock {
        fn new() -> Arc<Self> {
            Arc::new(StepClock(Mutex::new(1_700_000_000)))
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            let mut secs = self.0.lock();
            *secs += 1;
            Utc.timestamp_opt(*secs, 0).unwrap()
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<Bytes>> {
            Err(JsonLdError::Cache("store offline".into()))
        }

        async fn set(&self, _key: &str, _value: Bytes, _ttl: Duration) -> Result<()> {
            Err(JsonLdError::Cache("store offline".into()))
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            Err(JsonLdError::Cache("store offline".into()))
        }
    }

    fn stack(transport: Arc<Counting>, store: Arc<MemoryCache>) -> StageStack {
        StageStack::new(transport)
            .with_stage(CacheStage::new(store).with_clock(StepClock::new()))
    }

    fn get(lang: &str) -> JsonLdRequest {
        JsonLdRequest::get("http://api.test/letters")
            .with_param("limit", 10)
            .with_header("Accept-Language", lang)
    }

    #[test]
    fn test_parse_vary() {
        assert_eq!(
            parse_vary(Some("User-Agent, Accept-Language ,accept-language,")),
            vec!["accept-language".to_string(), "user-agent".to_string()]
        );
        assert!(parse_vary(None).is_empty());
        assert!(parse_vary(Some(" ")).is_empty());
    }

    #[test]
    fn test_method_classes() {
        assert!(is_cacheable_method("GET"));
        assert!(!is_cacheable_method("HEAD"));
        assert!(is_safe_method("options"));
        assert!(!is_safe_method("PATCH"));
    }

    #[tokio::test]
    async fn test_identical_gets_use_one_network_call() {
        let transport = Counting::new(Some("Accept-Language"));
        let stack = stack(transport.clone(), Arc::new(MemoryCache::new()));

        let first = stack.send(get("en"), RequestOptions::cached()).await.unwrap();
        let second = stack.send(get("en"), RequestOptions::cached()).await.unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(first.text(), "[1]");
        assert_eq!(second, first);
        assert_eq!(second.header("vary"), Some("Accept-Language"));
    }

    #[tokio::test]
    async fn test_cached_body_can_be_read_repeatedly() {
        let transport = Counting::new(None);
        let stack = stack(transport.clone(), Arc::new(MemoryCache::new()));

        stack.send(get("en"), RequestOptions::cached()).await.unwrap();
        for _ in 0..3 {
            let hit = stack.send(get("en"), RequestOptions::cached()).await.unwrap();
            assert_eq!(hit.body_str(), Some("[1]"));
        }
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_vary_header_change_misses() {
        let transport = Counting::new(Some("Accept-Language"));
        let stack = stack(transport.clone(), Arc::new(MemoryCache::new()));

        stack.send(get("en"), RequestOptions::cached()).await.unwrap();
        let other = stack.send(get("da"), RequestOptions::cached()).await.unwrap();
        assert_eq!(transport.calls(), 2);
        assert_eq!(other.text(), "[2]");

        // Both variants stay cached.
        assert_eq!(stack.send(get("en"), RequestOptions::cached()).await.unwrap().text(), "[1]");
        assert_eq!(stack.send(get("da"), RequestOptions::cached()).await.unwrap().text(), "[2]");
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_non_vary_header_change_hits() {
        let transport = Counting::new(Some("Accept-Language"));
        let stack = stack(transport.clone(), Arc::new(MemoryCache::new()));

        stack.send(get("en"), RequestOptions::cached()).await.unwrap();
        stack
            .send(get("en").with_header("X-Trace", "abc"), RequestOptions::cached())
            .await
            .unwrap();
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_query_change_misses() {
        let transport = Counting::new(None);
        let stack = stack(transport.clone(), Arc::new(MemoryCache::new()));

        stack.send(get("en"), RequestOptions::cached()).await.unwrap();
        stack
            .send(get("en").with_param("offset", 10), RequestOptions::cached())
            .await
            .unwrap();
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_unsafe_methods_invalidate() {
        for method in ["POST", "PUT", "DELETE", "PATCH"] {
            let transport = Counting::new(Some("Accept-Language"));
            let store = Arc::new(MemoryCache::new());
            let stack = stack(transport.clone(), store.clone());

            stack.send(get("en"), RequestOptions::cached()).await.unwrap();
            assert!(store.contains_key("jsonld_letters"));

            stack
                .send(
                    JsonLdRequest::new(method, "http://api.test/letters"),
                    RequestOptions::uncached(),
                )
                .await
                .unwrap();
            assert!(!store.contains_key("jsonld_letters"), "{} kept pre-cache", method);

            let fresh = stack.send(get("en"), RequestOptions::cached()).await.unwrap();
            assert_eq!(fresh.text(), "[3]", "{} did not invalidate", method);
            assert_eq!(transport.calls(), 3);
        }
    }

    #[tokio::test]
    async fn test_write_to_other_path_keeps_cache() {
        let transport = Counting::new(None);
        let stack = stack(transport.clone(), Arc::new(MemoryCache::new()));

        stack.send(get("en"), RequestOptions::cached()).await.unwrap();
        stack
            .send(JsonLdRequest::new("POST", "http://api.test/books"), RequestOptions::cached())
            .await
            .unwrap();
        stack.send(get("en"), RequestOptions::cached()).await.unwrap();
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_vary_change_retires_old_variants() {
        let transport = Counting::new(Some("Accept-Language"));
        let stack = stack(transport.clone(), Arc::new(MemoryCache::new()));

        assert_eq!(stack.send(get("en"), RequestOptions::cached()).await.unwrap().text(), "[1]");

        // The server switches to a different Vary header.
        transport.set_vary(Some("User-Agent"));
        assert_eq!(stack.send(get("da"), RequestOptions::cached()).await.unwrap().text(), "[2]");

        // Keys now ignore Accept-Language, so the old "en" variant is unreachable.
        assert_eq!(stack.send(get("en"), RequestOptions::cached()).await.unwrap().text(), "[2]");
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_value_older_than_pre_cache_is_stale() {
        let transport = Counting::new(None);
        let store = Arc::new(MemoryCache::new());
        let stack = stack(transport.clone(), store.clone());

        stack.send(get("en"), RequestOptions::cached()).await.unwrap();

        let newer = PreCacheRecord {
            headers: Vec::new(),
            timestamp: Utc.timestamp_opt(1_900_000_000, 0).unwrap(),
        };
        store
            .set("jsonld_letters", encode(&newer).unwrap(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(stack.send(get("en"), RequestOptions::cached()).await.unwrap().text(), "[2]");
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_uncached_get_bypasses_cache() {
        let transport = Counting::new(None);
        let store = Arc::new(MemoryCache::new());
        let stack = stack(transport.clone(), store.clone());

        stack.send(get("en"), RequestOptions::uncached()).await.unwrap();
        stack.send(get("en"), RequestOptions::uncached()).await.unwrap();
        assert_eq!(transport.calls(), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_head_is_not_cached() {
        let transport = Counting::new(None);
        let store = Arc::new(MemoryCache::new());
        let stack = stack(transport.clone(), store.clone());

        let head = || JsonLdRequest::new("HEAD", "http://api.test/letters");
        stack.send(head(), RequestOptions::cached()).await.unwrap();
        stack.send(head(), RequestOptions::cached()).await.unwrap();
        assert_eq!(transport.calls(), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_error_responses_are_not_stored() {
        let transport = Counting::failing(500);
        let store = Arc::new(MemoryCache::new());
        let stack = stack(transport.clone(), store.clone());

        stack.send(get("en"), RequestOptions::cached()).await.unwrap();
        stack.send(get("en"), RequestOptions::cached()).await.unwrap();
        assert_eq!(transport.calls(), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let transport = Counting::new(None);
        let stack = StageStack::new(transport.clone()).with_stage(CacheStage::new(Arc::new(BrokenStore)));

        let err = stack.send(get("en"), RequestOptions::cached()).await.unwrap_err();
        assert!(matches!(err, JsonLdError::Cache(_)));
        assert_eq!(transport.calls(), 0);

        let err = stack
            .send(JsonLdRequest::new("DELETE", "http://api.test/letters/1"), RequestOptions::uncached())
            .await
            .unwrap_err();
        assert!(matches!(err, JsonLdError::Cache(_)));
    }

    #[tokio::test]
    async fn test_records_use_configured_ttl() {
        let transport = Counting::new(None);
        let store = Arc::new(MemoryCache::new());
        let stack = StageStack::new(transport.clone())
            .with_stage(CacheStage::new(store.clone()).with_ttl(Duration::ZERO));

        stack.send(get("en"), RequestOptions::cached()).await.unwrap();
        stack.send(get("en"), RequestOptions::cached()).await.unwrap();
        assert_eq!(transport.calls(), 2);
    }
}
