//! Header codecs used for collection pagination.

pub mod constants;
pub mod content_range;
pub mod link;
pub mod range;

pub use constants::*;
pub use content_range::ContentRange;
pub use link::{LinkHeader, LinkRelation};
pub use range::Range;
