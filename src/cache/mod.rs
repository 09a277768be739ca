//! Vary-aware response cache.
//!
//! [`CacheStage`] sits in the client's stage pipeline and persists records
//! through any [`CacheStore`](crate::traits::CacheStore). [`MemoryCache`] is
//! the bundled in-process store.

pub mod keys;
pub mod memory;
pub mod middleware;
pub mod records;

pub use memory::MemoryCache;
pub use middleware::{parse_vary, CacheStage, DEFAULT_TTL};
pub use records::{PreCacheRecord, ValueRecord};
