//! A single type-to-URI mapping.

use crate::codec::{namespace, short_name, NAMESPACE_SEPARATOR};
use crate::error::{JsonLdError, Result};
use crate::types::QueryParams;
use once_cell::sync::Lazy;
use regex::Regex;

static TEMPLATE_PARAM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z0-9_-]+)\}").unwrap());

/// Where instances of one entity type live on the API.
///
/// The type name may end in a wildcard short name such as
/// `library::*Book`, which matches every type of the `library` namespace
/// whose short name ends with `Book`.
///
/// URIs may contain `{name}` segments that are filled from the request's
/// parameters, e.g. `https://api.test/authors/{author}/books`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappingEndpoint {
    type_name: String,
    uri: String,
    singleton: bool,
}

impl MappingEndpoint {
    /// Map a fully qualified type name to a URI.
    pub fn new(type_name: impl Into<String>, uri: impl Into<String>) -> Result<Self> {
        let type_name = type_name.into();
        if !type_name.contains(NAMESPACE_SEPARATOR) {
            return Err(JsonLdError::Config(format!(
                "Must use full type name, got {}",
                type_name
            )));
        }
        Ok(MappingEndpoint {
            type_name,
            uri: uri.into(),
            singleton: false,
        })
    }

    /// Mark the endpoint as a single resource rather than a collection.
    pub fn with_singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    pub fn matches(&self, type_name: &str) -> bool {
        if self.type_name == type_name {
            return true;
        }

        let expected = short_name(&self.type_name);
        let Some(suffix) = expected.strip_prefix('*') else {
            return false;
        };
        namespace(&self.type_name) == namespace(type_name)
            && short_name(type_name).ends_with(suffix)
    }

    pub fn matches_short_name(&self, short: &str) -> bool {
        short_name(&self.type_name) == short
    }

    /// The endpoint URL with template parameters substituted.
    pub fn url(&self, params: &QueryParams) -> Result<String> {
        let mut params = params.clone();
        self.take_url(&mut params)
    }

    /// Like [`url`](Self::url), but removes the consumed template
    /// parameters from `params`.
    pub fn take_url(&self, params: &mut QueryParams) -> Result<String> {
        let mut url = self.uri.trim_end_matches('/').to_string();
        let names: Vec<String> = TEMPLATE_PARAM_REGEX
            .captures_iter(&url)
            .map(|caps| caps[1].to_string())
            .collect();

        for name in names {
            let value = params
                .remove(&name)
                .ok_or_else(|| JsonLdError::Config(format!("Missing param: {}", name)))?;
            url = url.replace(&format!("{{{}}}", name), &value.to_string());
        }
        Ok(url)
    }

    /// Last literal path segment of the URI, used as the `Range` unit.
    pub fn unit_name(&self) -> String {
        let path = self
            .uri
            .split_once("://")
            .map(|(_, rest)| rest.split_once('/').map(|(_, path)| path).unwrap_or_default())
            .unwrap_or(&self.uri);

        path.split(&['?', '#'][..])
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|segment| !segment.is_empty() && !TEMPLATE_PARAM_REGEX.is_match(segment))
            .last()
            .map(str::to_string)
            .unwrap_or_else(|| short_name(&self.type_name).to_lowercase())
    }
}
