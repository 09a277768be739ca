//! Request logging stage.

use crate::client::stack::{Next, RequestOptions, Stage};
use crate::error::Result;
use crate::types::{JsonLdRequest, JsonLdResponse};
use async_trait::async_trait;
use std::time::Instant;
use tracing::Instrument;

/// Wraps each request in an `info` span and logs its outcome.
///
/// A disabled stage forwards requests without creating spans.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingStage {
    enabled: bool,
}

impl TracingStage {
    pub fn new(enabled: bool) -> Self {
        TracingStage { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[async_trait]
impl Stage for TracingStage {
    fn name(&self) -> &'static str {
        "tracing"
    }

    async fn handle(
        &self,
        request: JsonLdRequest,
        options: RequestOptions,
        next: Next<'_>,
    ) -> Result<JsonLdResponse> {
        if !self.enabled {
            return next.run(request, options).await;
        }

        let span = tracing::info_span!(
            "jsonld_request",
            method = %request.method,
            url = %request.url,
            use_cache = options.use_cache
        );
        let started = Instant::now();
        let result = next.run(request, options).instrument(span.clone()).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => {
                tracing::info!(parent: &span, status = response.status, elapsed_ms, "request completed")
            }
            Err(err) => {
                tracing::warn!(parent: &span, error = %err, elapsed_ms, "request failed")
            }
        }
        result
    }
}
