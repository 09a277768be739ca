//! Error types for JSON-LD client operations.
//!
//! This module defines every error that can surface from the client, the
//! remote collection cursor, the header codecs and the response cache.
//! The [`Result`] type alias provides a convenient shorthand for operations
//! that may fail.
//!
//! # Error Categories
//!
//! | Category | Variants | Caused by |
//! |----------|----------|-----------|
//! | Remote | `NotFound`, `Response` | The server answered with an error status |
//! | Payload | `Serialization` | A body could not be (de)serialized |
//! | Protocol | `Parse` | Malformed `Range`, `Content-Range` or `Link` header |
//! | Local | `Config`, `InvalidEntity`, `Io` | Misconfiguration or bad input |
//! | Cache | `Cache` | The cache backend failed |
//!
//! # Examples
//!
//! ```
//! use jsonld_client::JsonLdError;
//!
//! let err = JsonLdError::NotFound;
//! assert!(err.is_not_found());
//! assert_eq!(err.status(), Some(404));
//!
//! let err = JsonLdError::Parse("no size or range".into());
//! assert!(err.to_string().contains("no size or range"));
//! ```

use crate::types::ApiErrorResponse;
use std::io;
use thiserror::Error;

/// Result type for JSON-LD client operations.
pub type Result<T> = std::result::Result<T, JsonLdError>;

/// Errors that can occur while talking to a JSON-LD API.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum JsonLdError {
    /// The server answered `404 Not Found`.
    #[error("404: Not found")]
    NotFound,

    /// Any other failed HTTP exchange.
    ///
    /// `status` is `0` when the transport failed before a response arrived.
    /// `payload` holds the decoded error document when the server sent one.
    #[error("Response error ({status}): {message}")]
    Response {
        status: u16,
        message: String,
        payload: Option<ApiErrorResponse>,
    },

    /// A request or response body could not be (de)serialized.
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Malformed pagination header (`Range`, `Content-Range` or `Link`).
    #[error("Header parse error: {0}")]
    Parse(String),

    /// Missing URL template parameter, unknown mapping or invalid settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The entity cannot be persisted in its current state.
    #[error("Invalid entity: {0}")]
    InvalidEntity(String),

    /// The cache backend failed.
    #[error("Cache error: {0}")]
    Cache(String),

    /// I/O error while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<serde_json::Error> for JsonLdError {
    fn from(err: serde_json::Error) -> Self {
        JsonLdError::Serialization {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl JsonLdError {
    /// Build a response error, using the payload's display as the message
    /// when one was decoded.
    pub fn response(
        status: u16,
        message: impl Into<String>,
        payload: Option<ApiErrorResponse>,
    ) -> Self {
        let message = match &payload {
            Some(payload) if !payload.errors.is_empty() => payload.to_string(),
            _ => message.into(),
        };
        JsonLdError::Response {
            status,
            message,
            payload,
        }
    }

    /// Build a serialization error without an underlying JSON cause.
    pub fn serialization(message: impl Into<String>) -> Self {
        JsonLdError::Serialization {
            message: message.into(),
            source: None,
        }
    }

    /// Check if this is a `404 Not Found`.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, JsonLdError::NotFound)
    }

    /// HTTP status associated with this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            JsonLdError::NotFound => Some(404),
            JsonLdError::Response { status, .. } if *status != 0 => Some(*status),
            _ => None,
        }
    }

    /// Decoded error document returned by the server, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&ApiErrorResponse> {
        match self {
            JsonLdError::Response { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }
}
