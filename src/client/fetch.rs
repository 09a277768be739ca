//! Main JSON-LD client implementation.
//!
//! Provides [`JsonLdClient`], which maps entity types to endpoints, sends
//! requests through the stage pipeline and decodes the answers.

use crate::cache::CacheStage;
use crate::client::stack::{RequestOptions, StageStack};
use crate::client::tracing_stage::TracingStage;
use crate::client::ClientConfig;
use crate::codec::{from_jsonld_resolved, to_jsonld, JsonLdEntity};
use crate::collection::{deserialize_fn, fetch_fn, DeserializeFn, RemoteCollection};
use crate::error::{JsonLdError, Result};
use crate::mapping::{MappingCollection, MappingEndpoint};
use crate::protocol::headers;
use crate::traits::{CacheStore, Clock, Transport};
use crate::types::{ApiErrorResponse, Bytes, JsonLdRequest, JsonLdResponse, QueryParams};
use parking_lot::RwLock;
use std::sync::Arc;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Typed client for a JSON-LD REST API.
///
/// Cloning is cheap; clones share the transport, the cache and the access
/// token.
#[derive(Clone)]
pub struct JsonLdClient {
    stack: StageStack,
    mappings: Arc<MappingCollection>,
    config: Arc<ClientConfig>,
    access_token: Arc<RwLock<Option<String>>>,
}

impl JsonLdClient {
    pub fn builder(config: ClientConfig) -> JsonLdClientBuilder {
        JsonLdClientBuilder::new(config)
    }

    /// Create a client over `transport`, caching through `cache` when given.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        cache: Option<Arc<dyn CacheStore>>,
    ) -> Result<Self> {
        let mut builder = Self::builder(config).transport(transport);
        if let Some(cache) = cache {
            builder = builder.cache(cache);
        }
        builder.build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn mappings(&self) -> &MappingCollection {
        &self.mappings
    }

    pub fn stack(&self) -> &StageStack {
        &self.stack
    }

    /// Set or clear the bearer token sent with every request.
    pub fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write() = token;
    }

    pub fn access_token(&self) -> Option<String> {
        self.access_token.read().clone()
    }

    /// Lazily paginated collection of `T`.
    ///
    /// Template parameters of the endpoint URI are taken from `params`; the
    /// rest becomes the query of every page request.
    pub fn get_many<T: JsonLdEntity>(
        &self,
        params: QueryParams,
        use_cache: bool,
    ) -> Result<RemoteCollection<T>> {
        let endpoint = self.endpoint::<T>()?;
        if endpoint.is_singleton() {
            return Err(JsonLdError::Config(format!(
                "Cannot get many on non-collection {}",
                T::TYPE
            )));
        }

        let mut params = params;
        let url = endpoint.take_url(&mut params)?;
        let unit_name = endpoint.unit_name();

        let client = self.clone();
        let fetch_page = fetch_fn(move |query, extra| {
            let client = client.clone();
            let url = url.clone();
            async move {
                let mut request = client.prepare("GET", &url, query, None);
                for (name, value) in extra {
                    request = request.with_header(name, value);
                }
                client.send(request, use_cache).await
            }
        });

        Ok(RemoteCollection::new(
            fetch_page,
            entity_decoder::<T>(self.mappings.clone()),
            params,
            unit_name,
        ))
    }

    /// Fetch one entity. Singleton endpoints ignore `id`.
    pub async fn get_by_id<T: JsonLdEntity>(
        &self,
        id: &str,
        params: QueryParams,
        use_cache: bool,
    ) -> Result<T> {
        let endpoint = self.endpoint::<T>()?;
        let mut params = params;
        let mut url = endpoint.take_url(&mut params)?;
        if !endpoint.is_singleton() {
            url = format!("{}/{}", url, id);
        }

        let request = self.prepare("GET", &url, params, None);
        let response = self.send(request, use_cache).await?;
        decode_entity(&self.mappings, &response)
    }

    pub async fn get_singleton<T: JsonLdEntity>(
        &self,
        params: QueryParams,
        use_cache: bool,
    ) -> Result<T> {
        self.get_by_id("", params, use_cache).await
    }

    /// `POST` a new entity and return the server's representation.
    pub async fn create<T: JsonLdEntity>(&self, entity: &T, params: QueryParams) -> Result<T> {
        let endpoint = self.endpoint::<T>()?;
        let mut params = params;
        let url = endpoint.take_url(&mut params)?;
        self.persist("POST", &url, entity, params).await
    }

    /// `PUT` an existing entity to `url/id` (or `url` for singletons).
    pub async fn update<T: JsonLdEntity>(&self, entity: &T, params: QueryParams) -> Result<T> {
        let endpoint = self.endpoint::<T>()?;
        let mut params = params;
        let url = entity_url(endpoint, entity, &mut params)?;
        self.persist("PUT", &url, entity, params).await
    }

    /// `DELETE` an entity at `url/id` (or `url` for singletons).
    pub async fn delete<T: JsonLdEntity>(&self, entity: &T, params: QueryParams) -> Result<()> {
        let endpoint = self.endpoint::<T>()?;
        let mut params = params;
        let url = entity_url(endpoint, entity, &mut params)?;

        // Writes always pass the cache stage so the path is invalidated.
        let request = self.prepare("DELETE", &url, QueryParams::new(), None);
        self.send(request, true).await?;
        Ok(())
    }

    fn endpoint<T: JsonLdEntity>(&self) -> Result<&MappingEndpoint> {
        self.mappings.find_endpoint(T::TYPE)
    }

    async fn persist<T: JsonLdEntity>(
        &self,
        method: &str,
        url: &str,
        entity: &T,
        params: QueryParams,
    ) -> Result<T> {
        let body = to_jsonld(entity)?;
        let request = self.prepare(method, url, params, Some(body));
        let response = self.send(request, true).await?;
        decode_entity(&self.mappings, &response)
    }

    fn prepare(
        &self,
        method: &str,
        url: &str,
        query: QueryParams,
        body: Option<Bytes>,
    ) -> JsonLdRequest {
        let mut request = JsonLdRequest::new(method, url)
            .with_query(query)
            .with_header(headers::ACCEPT, JSON_CONTENT_TYPE)
            .with_header(headers::CONTENT_TYPE, JSON_CONTENT_TYPE)
            .with_header(headers::USER_AGENT, self.config.user_agent.as_str());

        for (name, value) in &self.config.default_headers {
            request = request.with_header(name.as_str(), value.as_str());
        }
        if let Some(token) = self.access_token() {
            request = request.with_header(headers::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = body {
            request = request.with_body(body);
        }
        request
    }

    async fn send(&self, request: JsonLdRequest, use_cache: bool) -> Result<JsonLdResponse> {
        let response = self.stack.send(request, RequestOptions { use_cache }).await?;
        check_status(response)
    }
}

impl std::fmt::Debug for JsonLdClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLdClient")
            .field("stack", &self.stack)
            .field("endpoints", &self.mappings.endpoints().len())
            .finish()
    }
}

/// Builder for [`JsonLdClient`].
pub struct JsonLdClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    cache: Option<Arc<dyn CacheStore>>,
    clock: Option<Arc<dyn Clock>>,
    mappings: Option<MappingCollection>,
}

impl JsonLdClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        JsonLdClientBuilder {
            config,
            transport: None,
            cache: None,
            clock: None,
            mappings: None,
        }
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Enable response caching through `cache`.
    pub fn cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Clock used for cache timestamps.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use `mappings` instead of the ones in the configuration.
    pub fn mappings(mut self, mappings: MappingCollection) -> Self {
        self.mappings = Some(mappings);
        self
    }

    pub fn build(self) -> Result<JsonLdClient> {
        let mappings = match self.mappings {
            Some(mappings) => mappings,
            None => self.config.mapping_collection()?,
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport(&self.config)?,
        };

        let mut stack = StageStack::new(transport);
        if let Some(cache) = self.cache {
            let mut stage = CacheStage::new(cache).with_ttl(self.config.cache_ttl());
            if let Some(clock) = self.clock {
                stage = stage.with_clock(clock);
            }
            stack = stack.with_stage(stage);
        }
        stack = stack.with_stage(TracingStage::new(self.config.enable_logging));

        Ok(JsonLdClient {
            stack,
            mappings: Arc::new(mappings),
            config: Arc::new(self.config),
            access_token: Arc::new(RwLock::new(None)),
        })
    }
}

#[cfg(feature = "native")]
fn default_transport(config: &ClientConfig) -> Result<Arc<dyn Transport>> {
    Ok(Arc::new(crate::client::ReqwestTransport::from_config(config)?))
}

#[cfg(not(feature = "native"))]
fn default_transport(_config: &ClientConfig) -> Result<Arc<dyn Transport>> {
    Err(JsonLdError::Config("No transport configured".into()))
}

/// A [`DeserializeFn`] decoding JSON-LD bodies into `T`, resolving `@type`
/// through `mappings`.
pub fn entity_decoder<T: JsonLdEntity>(mappings: Arc<MappingCollection>) -> DeserializeFn<T> {
    deserialize_fn(move |body| from_jsonld_resolved::<T, _>(body, |found| mappings.resolve_type(found)))
}

fn entity_url<T: JsonLdEntity>(
    endpoint: &MappingEndpoint,
    entity: &T,
    params: &mut QueryParams,
) -> Result<String> {
    let url = endpoint.take_url(params)?;
    if endpoint.is_singleton() {
        return Ok(url);
    }
    let id = entity
        .id()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| JsonLdError::InvalidEntity("Invalid object id".into()))?;
    Ok(format!("{}/{}", url, id))
}

fn decode_entity<T: JsonLdEntity>(mappings: &MappingCollection, response: &JsonLdResponse) -> Result<T> {
    let body = response
        .body_str()
        .ok_or_else(|| JsonLdError::serialization("Response body is not valid UTF-8"))?;
    from_jsonld_resolved::<T, _>(body, |found| mappings.resolve_type(found))?
        .into_first()
        .ok_or_else(|| JsonLdError::serialization(format!("No {} in response", T::short_type())))
}

/// Map error statuses to errors, decoding the error document when possible.
fn check_status(response: JsonLdResponse) -> Result<JsonLdResponse> {
    match response.status {
        404 => Err(JsonLdError::NotFound),
        status if status >= 400 => {
            let payload = serde_json::from_slice::<ApiErrorResponse>(&response.body)
                .ok()
                .filter(|payload| !payload.errors.is_empty());
            Err(JsonLdError::response(
                status,
                format!("Request failed with status {}", status),
                payload,
            ))
        }
        _ => Ok(response),
    }
}
