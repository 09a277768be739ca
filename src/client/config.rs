//! Configuration for the JSON-LD client.
//!
//! [`ClientConfig`] holds the endpoint mappings and the transport and cache
//! settings. Every field has a default, so a configuration file only needs to
//! name what it changes.
//!
//! # Configuration Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `default_type_namespace` | `app::entity` | Namespace for short type names |
//! | `mappings` | empty | Type to URI mappings |
//! | `request_timeout_ms` | 30000 | Transport timeout |
//! | `user_agent` | `jsonld-client-rs/<version>` | `User-Agent` header |
//! | `cache_ttl_secs` | 1800 | Lifetime of cache records |
//! | `default_headers` | empty | Headers added to every request |
//! | `enable_logging` | false | Log every request through `tracing` |
//!
//! # Mappings
//!
//! Mappings are either a list of entries or a map from type to URI:
//!
//! ```
//! use jsonld_client::ClientConfig;
//!
//! let config = ClientConfig::from_json_str(r#"{
//!     "default_type_namespace": "library",
//!     "mappings": {
//!         "Book": "https://api.test/books",
//!         "Profile": { "uri": "https://api.test/me", "singleton": true }
//!     }
//! }"#).unwrap();
//!
//! let mappings = config.mapping_collection().unwrap();
//! assert!(mappings.find_endpoint("library::Profile").unwrap().is_singleton());
//! ```
//!
//! ## Partial Override
//!
//! ```
//! use jsonld_client::ClientConfig;
//!
//! let config = ClientConfig {
//!     request_timeout_ms: 5000,
//!     ..Default::default()
//! };
//! assert_eq!(config.cache_ttl_secs, 1800); // Default
//! ```

use crate::error::{JsonLdError, Result};
use crate::mapping::{MappingCollection, MappingEntry, DEFAULT_NAMESPACE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Configuration for the JSON-LD client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Namespace used to qualify short type names in `mappings`.
    pub default_type_namespace: String,

    pub mappings: MappingConfig,

    /// Request timeout in milliseconds.
    ///
    /// Maximum time the transport waits for a complete response.
    pub request_timeout_ms: u64,

    pub user_agent: String,

    /// Lifetime of pre-cache and value records, in seconds.
    pub cache_ttl_secs: u64,

    /// Headers added to every request, such as trace propagation headers.
    pub default_headers: BTreeMap<String, String>,

    /// Enable request logging.
    ///
    /// When enabled, every request is logged with its status and duration
    /// using the `tracing` crate.
    pub enable_logging: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            default_type_namespace: DEFAULT_NAMESPACE.to_string(),
            mappings: MappingConfig::default(),
            request_timeout_ms: 30000,
            user_agent: format!("jsonld-client-rs/{}", env!("CARGO_PKG_VERSION")),
            cache_ttl_secs: 1800,
            default_headers: BTreeMap::new(),
            enable_logging: false,
        }
    }
}

impl ClientConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| JsonLdError::Config(format!("Invalid client configuration: {}", e)))
    }

    /// Read a JSON configuration file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json_str(&contents)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Build the endpoint table described by `mappings`.
    pub fn mapping_collection(&self) -> Result<MappingCollection> {
        MappingCollection::from_config(&self.mappings.entries(), &self.default_type_namespace)
    }
}

/// The `mappings` setting, in either of its accepted shapes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingConfig {
    List(Vec<MappingEntry>),
    Map(BTreeMap<String, MappingTarget>),
}

/// Value of a map-shaped mapping: a bare URI or an entry without its type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingTarget {
    Uri(String),
    Endpoint {
        uri: String,
        #[serde(default)]
        singleton: bool,
    },
}

impl Default for MappingConfig {
    fn default() -> Self {
        MappingConfig::List(Vec::new())
    }
}

impl MappingConfig {
    /// Normalize into a list of entries.
    pub fn entries(&self) -> Vec<MappingEntry> {
        match self {
            MappingConfig::List(entries) => entries.clone(),
            MappingConfig::Map(map) => map
                .iter()
                .map(|(type_name, target)| match target {
                    MappingTarget::Uri(uri) => MappingEntry::new(type_name.as_str(), uri.as_str()),
                    MappingTarget::Endpoint { uri, singleton } => MappingEntry {
                        type_name: type_name.clone(),
                        uri: uri.clone(),
                        singleton: *singleton,
                    },
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MappingConfig::List(entries) => entries.is_empty(),
            MappingConfig::Map(map) => map.is_empty(),
        }
    }
}
