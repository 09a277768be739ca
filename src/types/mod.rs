//! Core data types shared by the client, the cache and the cursor.

pub mod api_error;
pub mod query;
pub mod request;
pub mod response;

pub use api_error::{ApiError, ApiErrorResponse, ApiSource, ErrorCodes};
pub use bytes::Bytes;
pub use query::{QueryParams, QueryValue};
pub use request::JsonLdRequest;
pub use response::JsonLdResponse;

/// Case-insensitive header lookup over a header map.
pub(crate) fn find_header<'a>(
    headers: &'a std::collections::BTreeMap<String, String>,
    name: &str,
) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
