//! Lazily paginated view over a remote collection.
//!
//! A [`RemoteCollection`] fetches items in page-sized batches as they are
//! accessed. Batches are memoized by their starting offset, so every page is
//! requested at most once.
//!
//! # Pagination
//!
//! The first response decides how the rest of the collection is addressed:
//!
//! | First response carries | Mode | Batches |
//! |------------------------|------|---------|
//! | `Content-Range` | [`PaginationMode::ContentRangeBased`] | one per page |
//! | `Link` (no `Content-Range`) | [`PaginationMode::LinkBased`] | one per page |
//! | neither | [`PaginationMode::Unknown`] | a single batch |
//!
//! When the caller passes an explicit `offset` the mode is
//! [`PaginationMode::Disabled`] from the start and exactly one page is
//! fetched, at that offset.
//!
//! # Counting
//!
//! [`RemoteCollection::count`] prefers the server's figures:
//! a `Content-Range` size, else the `last` link offset plus the length of the
//! last page (or a full page while it has not been fetched, which may
//! overestimate), else the number of items fetched so far.
//!
//! # Example
//!
//! ```ignore
//! let mut letters = client.get_many::<Letter>(QueryParams::new(), true)?;
//! let total = letters.count().await?;
//! while let Some(letter) = letters.next_item().await? {
//!     println!("{}", letter.letter);
//! }
//! ```

use crate::codec::OneOrMany;
use crate::error::{JsonLdError, Result};
use crate::protocol::{headers, params, relations, ContentRange, LinkHeader, Range};
use crate::types::{JsonLdResponse, QueryParams, QueryValue};
use futures::future::{BoxFuture, FutureExt};
use futures::Stream;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

/// Items per page when the caller does not pass a usable `limit`.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Fetches one page: receives the query parameters and extra request
/// headers, returns the raw response.
pub type FetchPageFn = Arc<
    dyn Fn(QueryParams, BTreeMap<String, String>) -> BoxFuture<'static, Result<JsonLdResponse>>
        + Send
        + Sync,
>;

/// Turns a response body into one item or a list of items.
pub type DeserializeFn<T> = Arc<dyn Fn(&str) -> Result<OneOrMany<T>> + Send + Sync>;

/// Wrap an async closure as a [`FetchPageFn`].
pub fn fetch_fn<F, Fut>(f: F) -> FetchPageFn
where
    F: Fn(QueryParams, BTreeMap<String, String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<JsonLdResponse>> + Send + 'static,
{
    Arc::new(move |query: QueryParams, extra: BTreeMap<String, String>| f(query, extra).boxed())
}

/// Wrap a closure as a [`DeserializeFn`].
pub fn deserialize_fn<T, F>(f: F) -> DeserializeFn<T>
where
    F: Fn(&str) -> Result<OneOrMany<T>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// How batch keys are derived from item indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaginationMode {
    /// No response yet, or the first response carried no pagination headers.
    Unknown,
    LinkBased,
    ContentRangeBased,
    /// An explicit offset was requested; only one page exists.
    Disabled,
}

impl PaginationMode {
    #[inline]
    pub fn is_paginated(self) -> bool {
        matches!(self, PaginationMode::LinkBased | PaginationMode::ContentRangeBased)
    }
}

/// Pagination headers of the first response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaginationMetadata {
    pub link: Option<LinkHeader>,
    pub content_range: Option<ContentRange>,
}

impl PaginationMetadata {
    /// Read the headers of `response`. `Content-Range` takes precedence and
    /// suppresses `Link`.
    pub fn from_response(response: &JsonLdResponse) -> Result<Self> {
        let content_range = response
            .header(headers::CONTENT_RANGE)
            .map(ContentRange::from_header_value)
            .transpose()?;
        let link = match content_range {
            Some(_) => None,
            None => response.header(headers::LINK).map(LinkHeader::parse),
        };
        Ok(PaginationMetadata { link, content_range })
    }

    fn mode(&self) -> PaginationMode {
        if self.content_range.is_some() {
            PaginationMode::ContentRangeBased
        } else if self.link.is_some() {
            PaginationMode::LinkBased
        } else {
            PaginationMode::Unknown
        }
    }
}

/// Lazy, memoizing cursor over a paginated remote collection.
pub struct RemoteCollection<T> {
    fetch_page: FetchPageFn,
    deserialize: DeserializeFn<T>,
    params: QueryParams,
    unit_name: String,
    page_size: usize,
    mode: PaginationMode,
    metadata: PaginationMetadata,
    batches: BTreeMap<usize, Vec<T>>,
    has_requested: bool,
    position: usize,
    fetch_count: usize,
}

impl<T> RemoteCollection<T> {
    /// Create a cursor. Nothing is fetched until the first access.
    ///
    /// `unit_name` becomes the unit of the `Range` header sent with every
    /// page request.
    pub fn new(
        fetch_page: FetchPageFn,
        deserialize: DeserializeFn<T>,
        params: QueryParams,
        unit_name: impl Into<String>,
    ) -> Self {
        let page_size = match params.get(params::LIMIT) {
            None => DEFAULT_PAGE_SIZE,
            Some(limit) => match limit.as_u64().and_then(|n| usize::try_from(n).ok()) {
                Some(n) if n > 0 => n,
                _ => {
                    tracing::warn!(
                        "Ignoring invalid limit {}, using {}",
                        limit,
                        DEFAULT_PAGE_SIZE
                    );
                    DEFAULT_PAGE_SIZE
                }
            },
        };

        let mode = if params.contains_key(params::OFFSET) {
            PaginationMode::Disabled
        } else {
            PaginationMode::Unknown
        };

        RemoteCollection {
            fetch_page,
            deserialize,
            params,
            unit_name: unit_name.into(),
            page_size,
            mode,
            metadata: PaginationMetadata::default(),
            batches: BTreeMap::new(),
            has_requested: false,
            position: 0,
            fetch_count: 0,
        }
    }

    /// Item at `index`, fetching its page when needed.
    pub async fn get(&mut self, index: usize) -> Result<Option<&T>> {
        if !self.has_requested {
            self.fetch_batch(0).await?;
        }

        let (key, offset) = self.locate(index);
        if self.mode.is_paginated() && !self.batches.contains_key(&key) {
            self.fetch_batch(key).await?;
        }

        Ok(self.batches.get(&key).and_then(|batch| batch.get(offset)))
    }

    pub async fn contains(&mut self, index: usize) -> Result<bool> {
        Ok(self.get(index).await?.is_some())
    }

    /// Total number of items, as far as it is known.
    pub async fn count(&mut self) -> Result<usize> {
        if !self.has_requested {
            self.fetch_batch(0).await?;
        }

        match self.reported_total() {
            Some(total) if total > 0 => Ok(total),
            _ => Ok(self.loaded_len()),
        }
    }

    /// Next item of the forward iteration, `None` at the first gap.
    pub async fn next_item(&mut self) -> Result<Option<T>>
    where
        T: Clone,
    {
        let position = self.position;
        let item = self.get(position).await?.cloned();
        if item.is_some() {
            self.position += 1;
        }
        Ok(item)
    }

    /// Restart iteration at index 0. Fetched pages are kept.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Rewind and collect every item.
    pub async fn collect_all(&mut self) -> Result<Vec<T>>
    where
        T: Clone,
    {
        self.rewind();
        let mut items = Vec::new();
        while let Some(item) = self.next_item().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Stream the remaining items from the current position.
    pub fn stream(&mut self) -> impl Stream<Item = Result<T>> + '_
    where
        T: Clone,
    {
        futures::stream::try_unfold(self, |cursor| async move {
            let item = cursor.next_item().await?;
            Ok::<_, JsonLdError>(item.map(|item| (item, cursor)))
        })
    }

    /// The collection is read-only; writes are ignored.
    pub fn set(&mut self, index: usize, _value: T) {
        tracing::debug!("Ignoring write to remote collection index {}", index);
    }

    /// The collection is read-only; removals are ignored.
    pub fn unset(&mut self, index: usize) {
        tracing::debug!("Ignoring removal of remote collection index {}", index);
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn mode(&self) -> PaginationMode {
        self.mode
    }

    pub fn metadata(&self) -> &PaginationMetadata {
        &self.metadata
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    /// Number of completed page fetches.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count
    }

    /// Number of items fetched so far.
    pub fn loaded_len(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }

    fn locate(&self, index: usize) -> (usize, usize) {
        if self.mode.is_paginated() {
            let key = index / self.page_size * self.page_size;
            (key, index % self.page_size)
        } else {
            (0, index)
        }
    }

    fn reported_total(&self) -> Option<usize> {
        if let Some(range) = &self.metadata.content_range {
            return range.known_size().and_then(|size| usize::try_from(size).ok());
        }
        let last = self.metadata.link.as_ref()?.offset(relations::LAST)?;
        let last = usize::try_from(last).ok()?;
        let last_page = self
            .batches
            .get(&last)
            .map_or(self.page_size, Vec::len);
        Some(last.saturating_add(last_page))
    }

    async fn fetch_batch(&mut self, key: usize) -> Result<()> {
        let query_offset = self
            .params
            .get(params::OFFSET)
            .cloned()
            .unwrap_or_else(|| QueryValue::from(key));
        let start = query_offset.as_u64().unwrap_or(0);
        let end = start.saturating_add(self.page_size as u64 - 1);
        let range = Range::new(self.unit_name.as_str(), start, end);

        let mut query = self.params.clone();
        query.insert(params::OFFSET.to_string(), query_offset);
        query.insert(params::LIMIT.to_string(), QueryValue::from(self.page_size));

        let mut extra = BTreeMap::new();
        extra.insert(headers::RANGE.to_string(), range.to_header_value());

        tracing::debug!("Fetching {} batch {} ({})", self.unit_name, key, range);
        let response = (self.fetch_page)(query, extra).await?;

        // Nothing is recorded until the whole response has been understood.
        let metadata = if self.has_requested {
            None
        } else {
            Some(PaginationMetadata::from_response(&response)?)
        };

        let batch = if response.is_empty_collection() {
            Vec::new()
        } else {
            let body = response
                .body_str()
                .ok_or_else(|| JsonLdError::serialization("Response body is not valid UTF-8"))?;
            (self.deserialize)(body)?.into_vec()
        };

        if let Some(metadata) = metadata {
            if self.mode != PaginationMode::Disabled {
                self.mode = metadata.mode();
            }
            self.metadata = metadata;
        }
        self.has_requested = true;
        self.fetch_count += 1;
        self.batches.insert(key, batch);
        Ok(())
    }
}

impl<T> std::fmt::Debug for RemoteCollection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCollection")
            .field("unit_name", &self.unit_name)
            .field("page_size", &self.page_size)
            .field("mode", &self.mode)
            .field("batches", &self.batches.keys().collect::<Vec<_>>())
            .field("position", &self.position)
            .finish()
    }
}
