//! Header names, query parameter names and link relations.

pub mod headers {
    pub const LINK: &str = "Link";
    pub const CONTENT_RANGE: &str = "Content-Range";
    pub const RANGE: &str = "Range";
    pub const VARY: &str = "Vary";
    pub const ACCEPT: &str = "Accept";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const USER_AGENT: &str = "User-Agent";
}

pub mod params {
    pub const OFFSET: &str = "offset";
    pub const LIMIT: &str = "limit";
}

pub mod relations {
    pub const FIRST: &str = "first";
    pub const PREV: &str = "prev";
    pub const NEXT: &str = "next";
    pub const LAST: &str = "last";
}

/// Unit used when none is given.
pub const DEFAULT_UNIT: &str = "bytes";
