//! JSON-LD HTTP client.
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── fetch          - JsonLdClient and its builder
//! ├── stack          - Stage pipeline in front of the transport
//! ├── tracing_stage  - Per-request spans and logging
//! ├── native_network - reqwest transport
//! └── config         - Client configuration
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`JsonLdClient`] | Typed client over mapped endpoints |
//! | [`StageStack`] | Ordered request stages and the transport |
//! | [`ClientConfig`] | Client configuration options |
//!
//! # Examples
//!
//! ```ignore
//! use std::sync::Arc;
//! use jsonld_client::{ClientConfig, JsonLdClient, MemoryCache, QueryParams};
//!
//! let config = ClientConfig::load("jsonld.json").await?;
//! let client = JsonLdClient::builder(config)
//!     .cache(Arc::new(MemoryCache::new()))
//!     .build()?;
//! let book: Book = client.get_by_id("42", QueryParams::new(), true).await?;
//! ```

mod config;
mod fetch;
#[cfg(feature = "native")]
pub mod native_network;
pub mod stack;
pub mod tracing_stage;

pub use config::{ClientConfig, MappingConfig, MappingTarget};
pub use fetch::{entity_decoder, JsonLdClient, JsonLdClientBuilder};
#[cfg(feature = "native")]
pub use native_network::ReqwestTransport;
pub use stack::{Next, RequestOptions, Stage, StageStack};
pub use tracing_stage::TracingStage;
