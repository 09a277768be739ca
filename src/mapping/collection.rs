//! Lookup table from entity types to endpoints.

use super::MappingEndpoint;
use crate::codec::{namespace, NAMESPACE_SEPARATOR};
use crate::error::{JsonLdError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HTTP_URI_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://").unwrap());

/// Namespace used to qualify short type names when none is configured.
pub const DEFAULT_NAMESPACE: &str = "app::entity";

/// Namespace of the error document types bundled with this crate.
pub const BUILTIN_NAMESPACE: &str = "jsonld_client";

const BUILTIN_TYPES: &[&str] = &["ApiError", "ApiErrorResponse"];

/// One configured mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    #[serde(rename = "type")]
    pub type_name: String,
    pub uri: String,
    #[serde(default)]
    pub singleton: bool,
}

impl MappingEntry {
    pub fn new(type_name: impl Into<String>, uri: impl Into<String>) -> Self {
        MappingEntry {
            type_name: type_name.into(),
            uri: uri.into(),
            singleton: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MappingCollection {
    default_namespace: String,
    endpoints: Vec<MappingEndpoint>,
}

impl MappingCollection {
    pub fn new(endpoints: Vec<MappingEndpoint>, default_namespace: &str) -> Self {
        MappingCollection {
            default_namespace: default_namespace
                .trim_end_matches(NAMESPACE_SEPARATOR)
                .to_string(),
            endpoints,
        }
    }

    /// Build endpoints from configuration entries.
    ///
    /// Short type names are qualified with `default_namespace`; every URI
    /// must be absolute `http` or `https`.
    pub fn from_config(entries: &[MappingEntry], default_namespace: &str) -> Result<Self> {
        let namespace = default_namespace.trim_end_matches(NAMESPACE_SEPARATOR);
        let endpoints = entries
            .iter()
            .map(|entry| {
                if entry.type_name.is_empty() || entry.uri.is_empty() {
                    return Err(JsonLdError::Config("Invalid collection".into()));
                }
                if !HTTP_URI_REGEX.is_match(&entry.uri) {
                    return Err(JsonLdError::Config(format!("Invalid uri {}", entry.uri)));
                }
                let type_name = if entry.type_name.contains(NAMESPACE_SEPARATOR) {
                    entry.type_name.clone()
                } else {
                    format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, entry.type_name)
                };
                Ok(MappingEndpoint::new(type_name, entry.uri.as_str())?.with_singleton(entry.singleton))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(MappingCollection::new(endpoints, namespace))
    }

    pub fn endpoints(&self) -> &[MappingEndpoint] {
        &self.endpoints
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    pub fn push(&mut self, endpoint: MappingEndpoint) {
        self.endpoints.push(endpoint);
    }

    /// First endpoint matching `type_name`.
    pub fn find_endpoint(&self, type_name: &str) -> Result<&MappingEndpoint> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.matches(type_name))
            .ok_or_else(|| JsonLdError::Config(format!("No mapping for type {}", type_name)))
    }

    /// Resolve a short type name as found in an `@type` member.
    ///
    /// Exact endpoints win over wildcard ones; unknown names fall into the
    /// default namespace.
    pub fn find_type_by_short_name_or_default(&self, short: &str) -> String {
        if BUILTIN_TYPES.contains(&short) {
            return format!("{}{}{}", BUILTIN_NAMESPACE, NAMESPACE_SEPARATOR, short);
        }

        if let Some(endpoint) = self.endpoints.iter().find(|e| e.matches_short_name(short)) {
            return endpoint.type_name().to_string();
        }

        self.endpoints
            .iter()
            .find_map(|endpoint| {
                let candidate = format!(
                    "{}{}{}",
                    namespace(endpoint.type_name()),
                    NAMESPACE_SEPARATOR,
                    short
                );
                endpoint.matches(&candidate).then_some(candidate)
            })
            .unwrap_or_else(|| {
                format!("{}{}{}", self.default_namespace, NAMESPACE_SEPARATOR, short)
            })
    }

    /// Full type name for an `@type` value, qualified or not.
    pub fn resolve_type(&self, type_name: &str) -> String {
        if type_name.contains(NAMESPACE_SEPARATOR) {
            type_name.to_string()
        } else {
            self.find_type_by_short_name_or_default(type_name)
        }
    }
}
