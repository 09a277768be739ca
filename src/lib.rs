//! jsonld_client: typed client for JSON-LD REST APIs.
//!
//! The crate is organized around a few components:
//!
//! - **client**: [`JsonLdClient`], endpoint mapping and the request stage pipeline.
//! - **collection**: [`RemoteCollection`], a lazily paginated cursor driven by
//!   `Link` or `Content-Range` headers.
//! - **cache**: a `Vary`-aware response cache with path-wide invalidation.
//! - **protocol**: `Range`, `Content-Range` and `Link` header codecs.
//!
//! The transport and the cache backend are traits ([`Transport`],
//! [`CacheStore`]); the `native` feature provides a `reqwest` transport.

pub mod cache;
pub mod client;
pub mod codec;
pub mod collection;
pub mod error;
pub mod mapping;
pub mod protocol;
pub mod traits;
pub mod types;

// Top-level re-exports for common usage
pub use crate::cache::{CacheStage, MemoryCache};
pub use crate::client::{ClientConfig, JsonLdClient, JsonLdClientBuilder, RequestOptions, Stage, StageStack};
pub use crate::codec::{JsonLdEntity, OneOrMany};
pub use crate::collection::{PaginationMode, RemoteCollection};
pub use crate::error::{JsonLdError, Result};
pub use crate::mapping::{MappingCollection, MappingEndpoint};
pub use crate::protocol::{ContentRange, LinkHeader, Range};
pub use crate::traits::{CacheStore, Clock, SystemClock, Transport};
pub use crate::types::{
    ApiError, ApiErrorResponse, ErrorCodes, JsonLdRequest, JsonLdResponse, QueryParams, QueryValue,
};

#[cfg(feature = "native")]
pub use crate::client::ReqwestTransport;
