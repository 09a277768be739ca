//! Error documents returned by JSON-LD APIs.
//!
//! The shape follows the JSON:API error object: a top-level `errors` array
//! whose members carry an id, status, code, human readable title/detail and
//! an optional pointer to the offending input.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of the input that caused an error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSource {
    #[serde(default)]
    pub pointer: Option<String>,
    #[serde(default)]
    pub parameter: Option<String>,
}

/// A single error object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub source: Option<ApiSource>,
}

impl ApiError {
    /// `true` when the error code marks a missing or invalid access token.
    pub fn is_token_error(&self) -> bool {
        ErrorCodes::is_token_error(self.code.as_deref())
    }
}

/// Error document wrapping one or more [`ApiError`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

impl fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .errors
            .iter()
            .map(|error| {
                let message = error
                    .title
                    .as_deref()
                    .or(error.detail.as_deref())
                    .unwrap_or_default();
                format!("{}: {}", error.status.as_deref().unwrap_or_default(), message)
            })
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&rendered)
    }
}

/// Well-known API error codes.
pub struct ErrorCodes;

impl ErrorCodes {
    pub const TOKEN_NOT_FOUND: &'static str = "AS10001";
    pub const TOKEN_INVALID: &'static str = "AS10002";

    pub fn is_token_error(code: Option<&str>) -> bool {
        matches!(code, Some(Self::TOKEN_NOT_FOUND) | Some(Self::TOKEN_INVALID))
    }
}
