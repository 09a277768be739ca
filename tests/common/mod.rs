#![allow(dead_code)]

use async_trait::async_trait;
use jsonld_client::types::Bytes;
use jsonld_client::{
    CacheStore, ClientConfig, JsonLdClient, JsonLdEntity, JsonLdError, JsonLdRequest, JsonLdResponse, MemoryCache,
    Result, Transport,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

type Handler = dyn Fn(&JsonLdRequest) -> Result<JsonLdResponse> + Send + Sync;

/// Transport answering from a closure and recording every request.
pub struct MockTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<JsonLdRequest>>,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&JsonLdRequest) -> Result<JsonLdResponse> + Send + Sync + 'static,
    {
        Arc::new(MockTransport {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answer every request with `status` and `body`.
    pub fn always(status: u16, body: impl Into<Bytes>) -> Arc<Self> {
        let body = body.into();
        Self::new(move |_| Ok(JsonLdResponse::new(status, body.clone())))
    }

    pub fn failing() -> Arc<Self> {
        Self::new(|_| Err(JsonLdError::response(0, "Error Communicating with Server", None)))
    }

    pub fn requests(&self) -> Vec<JsonLdRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> Option<JsonLdRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, request: JsonLdRequest) -> Result<JsonLdResponse> {
        let response = (self.handler)(&request);
        self.requests.lock().push(request);
        response
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimpleClass {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub value: String,
}

impl SimpleClass {
    pub fn new(id: Option<&str>, value: &str) -> Self {
        SimpleClass {
            id: id.map(str::to_string),
            value: value.to_string(),
        }
    }
}

impl JsonLdEntity for SimpleClass {
    const TYPE: &'static str = "fixtures::SimpleClass";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NestedArrayClass {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub string: String,
    #[serde(rename = "simpleClasses", default)]
    pub simple_classes: Vec<SimpleClass>,
}

impl JsonLdEntity for NestedArrayClass {
    const TYPE: &'static str = "fixtures::NestedArrayClass";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
}

impl JsonLdEntity for Profile {
    const TYPE: &'static str = "fixtures::Profile";

    fn id(&self) -> Option<&str> {
        None
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Letter {
    pub letter: String,
}

impl JsonLdEntity for Letter {
    const TYPE: &'static str = "fixtures::Letter";

    fn id(&self) -> Option<&str> {
        None
    }
}

pub fn config() -> ClientConfig {
    ClientConfig::from_json_str(
        r#"{
            "default_type_namespace": "fixtures",
            "mappings": {
                "SimpleClass": "http://api.test/simple",
                "NestedArrayClass": "http://api.test/nestedarray",
                "Profile": { "uri": "http://api.test/me", "singleton": true },
                "Letter": "http://api.test/authors/{author}/letters"
            }
        }"#,
    )
    .unwrap()
}

pub fn client(transport: Arc<MockTransport>) -> JsonLdClient {
    init_tracing();
    JsonLdClient::new(config(), transport, None).unwrap()
}

pub fn cached_client(transport: Arc<MockTransport>) -> (JsonLdClient, Arc<MemoryCache>) {
    init_tracing();
    let cache = Arc::new(MemoryCache::new());
    let store: Arc<dyn CacheStore> = cache.clone();
    let client = JsonLdClient::new(config(), transport, Some(store)).unwrap();
    (client, cache)
}

/// JSON array of `SimpleClass` objects valued `test value <n>`.
pub fn simple_values(range: std::ops::Range<usize>) -> String {
    let items: Vec<String> = range
        .map(|n| format!(r#"{{"@type":"SimpleClass","value":"test value {}"}}"#, n))
        .collect();
    format!("[{}]", items.join(","))
}
