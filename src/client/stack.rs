//! Request pipeline built from named stages.
//!
//! A [`StageStack`] holds an ordered list of [`Stage`]s in front of a
//! [`Transport`]. Each stage receives the request, the per-call
//! [`RequestOptions`] and a [`Next`] handle for the remainder of the chain.
//! Stages run outermost first: the first stage added sees every request and
//! may answer without calling `next` at all.
//!
//! ```ignore
//! let stack = StageStack::new(transport)
//!     .with_stage(CacheStage::new(store))
//!     .with_stage(TracingStage::new(true));
//! assert_eq!(stack.stage_names(), vec!["cache", "tracing"]);
//! ```

use crate::error::Result;
use crate::traits::Transport;
use crate::types::{JsonLdRequest, JsonLdResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// Per-call options carried alongside a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Allow the cache stage to answer this request and store its response.
    pub use_cache: bool,
}

impl RequestOptions {
    #[inline]
    pub fn cached() -> Self {
        RequestOptions { use_cache: true }
    }

    #[inline]
    pub fn uncached() -> Self {
        RequestOptions { use_cache: false }
    }
}

/// One named step of the request pipeline.
#[async_trait]
pub trait Stage: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn handle(
        &self,
        request: JsonLdRequest,
        options: RequestOptions,
        next: Next<'_>,
    ) -> Result<JsonLdResponse>;
}

/// The part of the pipeline after the current stage.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    stages: &'a [Arc<dyn Stage>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    /// Hand the request to the next stage, or to the transport when no
    /// stages remain.
    pub async fn run(self, request: JsonLdRequest, options: RequestOptions) -> Result<JsonLdResponse> {
        match self.stages.split_first() {
            Some((stage, rest)) => {
                let next = Next {
                    stages: rest,
                    transport: self.transport,
                };
                stage.handle(request, options, next).await
            }
            None => self.transport.fetch(request).await,
        }
    }
}

/// Ordered stages in front of a transport.
#[derive(Clone)]
pub struct StageStack {
    stages: Vec<Arc<dyn Stage>>,
    transport: Arc<dyn Transport>,
}

impl StageStack {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        StageStack {
            stages: Vec::new(),
            transport,
        }
    }

    /// Append a stage after the ones already present.
    pub fn with_stage(mut self, stage: impl Stage) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn with_shared_stage(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub async fn send(&self, request: JsonLdRequest, options: RequestOptions) -> Result<JsonLdResponse> {
        let next = Next {
            stages: &self.stages,
            transport: self.transport.as_ref(),
        };
        next.run(request, options).await
    }
}

impl std::fmt::Debug for StageStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageStack")
            .field("stages", &self.stage_names())
            .finish()
    }
}
