//! Error types for the ListSplit gateway.
//!
//! # Design
//! The gateway never panics or unwinds past its own boundary: every outcome of
//! a request is either a decoded value plus status code, or one of the four
//! variants below. A non-2xx status is *not* an error at this layer, since
//! error bodies that match the expected shape still decode and callers are
//! expected to inspect the status themselves.

use std::fmt;

/// Errors returned by `ApiClient`, `Transport` and `Gateway`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The endpoint could not be resolved against the base address.
    InvalidEndpoint(String),

    /// No usable response was received (e.g. the body could not be read).
    RequestFailed,

    /// The response body did not match the expected shape.
    DecodingFailed(String),

    /// Transport-level failure such as refused connections or DNS errors.
    Unknown(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidEndpoint(endpoint) => write!(f, "invalid endpoint: {endpoint}"),
            ApiError::RequestFailed => write!(f, "request failed: no usable response"),
            ApiError::DecodingFailed(msg) => write!(f, "decoding failed: {msg}"),
            ApiError::Unknown(cause) => write!(f, "transport error: {cause}"),
        }
    }
}

impl std::error::Error for ApiError {}
