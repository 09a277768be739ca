use crate::client::ClientConfig;
use crate::error::{JsonLdError, Result};
use crate::traits::Transport;
use crate::types::{JsonLdRequest, JsonLdResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;

/// [`Transport`] over a `reqwest` client.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client with the configured timeout and user agent.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| JsonLdError::Config(format!("Cannot build HTTP client: {}", e)))?;
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, request: JsonLdRequest) -> Result<JsonLdResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| JsonLdError::Config(format!("Invalid method {}: {}", request.method, e)))?;
        let url = request.full_url()?;

        let mut req_builder = self.client.request(method, url);
        for (k, v) in &request.headers {
            req_builder = req_builder.header(k.as_str(), v.as_str());
        }
        if !request.body.is_empty() {
            req_builder = req_builder.body(request.body.clone());
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| JsonLdError::response(0, e.to_string(), None))?;

        let status = response.status().as_u16();
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (k, v) in response.headers() {
            if let Ok(val) = v.to_str() {
                // Repeated headers such as Link fold into one list value.
                headers
                    .entry(k.as_str().to_string())
                    .and_modify(|existing| {
                        existing.push_str(", ");
                        existing.push_str(val);
                    })
                    .or_insert_with(|| val.to_string());
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| JsonLdError::response(status, e.to_string(), None))?;

        Ok(JsonLdResponse {
            status,
            headers,
            body,
        })
    }
}
