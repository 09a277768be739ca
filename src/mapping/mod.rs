//! Entity type to endpoint mappings.

pub mod collection;
pub mod endpoint;

pub use collection::{MappingCollection, MappingEntry, BUILTIN_NAMESPACE, DEFAULT_NAMESPACE};
pub use endpoint::MappingEndpoint;
