//! Error types for building and sending API requests

use std::path::PathBuf;

use bytes::Bytes;
use serde::Deserialize;
use smol_str::SmolStr;

/// Client error type wrapping all possible error conditions
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ClientError {
    /// The request could not be built (bad input, missing file, etc.)
    #[error("{0}")]
    Build(
        #[from]
        #[diagnostic_source]
        BuildError,
    ),

    /// HTTP transport error
    #[error("HTTP transport error: {0}")]
    Transport(
        #[from]
        #[diagnostic_source]
        TransportError,
    ),

    /// The vendor answered with a non-zero `errcode`
    #[error("{0}")]
    Vendor(
        #[from]
        #[diagnostic_source]
        VendorApiError,
    ),

    /// Response deserialization failed
    #[error("{0}")]
    Decode(
        #[from]
        #[diagnostic_source]
        DecodeError,
    ),

    /// HTTP error response
    #[error("{0}")]
    Http(
        #[from]
        #[diagnostic_source]
        HttpError,
    ),
}

/// Local errors raised while assembling a request, before any I/O on the wire
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum BuildError {
    /// Upload source path does not exist or cannot be read
    #[error("File not found or unreadable: {}", path.display())]
    #[diagnostic(code(wecom::build::file_not_found))]
    FileNotFound {
        /// The path as given by the caller
        path: PathBuf,
        /// Underlying I/O error from the metadata lookup
        #[source]
        source: std::io::Error,
    },

    /// Caller-supplied argument is unusable (empty filename, wrong media kind, ...)
    #[error("Invalid argument: {0}")]
    #[diagnostic(code(wecom::build::invalid_argument))]
    InvalidArgument(String),

    /// A JSON body or form field could not be serialized
    #[error("Failed to serialize JSON: {0}")]
    #[diagnostic(code(wecom::build::serialization))]
    Serialization(
        #[from]
        #[source]
        serde_json::Error,
    ),
}

impl BuildError {
    /// Shorthand for [`BuildError::InvalidArgument`]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Transport-level errors that occur during HTTP communication
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TransportError {
    /// Failed to establish connection to server
    #[error("Connection error: {0}")]
    Connect(String),

    /// Request timed out
    #[error("Request timeout")]
    Timeout,

    /// Request construction failed (malformed URI, headers, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Other transport error
    #[error("Transport error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Error reported by the vendor in the response body.
///
/// Every endpoint answers with `{"errcode": .., "errmsg": ..}` on failure, often
/// with HTTP 200. The code is surfaced as-is.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, thiserror::Error, miette::Diagnostic)]
#[error("API error {errcode}: {errmsg}")]
pub struct VendorApiError {
    /// Vendor error code (never 0)
    pub errcode: i64,
    /// Vendor error message
    #[serde(default)]
    pub errmsg: SmolStr,
}

impl VendorApiError {
    /// Inspect a JSON body and return the vendor error it carries, if any.
    ///
    /// Bodies that are not JSON objects, or that carry `errcode: 0`, yield `None`.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_slice(body).ok()?;
        let object = value.as_object()?;
        let errcode = object.get("errcode")?.as_i64()?;
        if errcode == 0 {
            return None;
        }
        let errmsg = object
            .get("errmsg")
            .and_then(|m| m.as_str())
            .map(SmolStr::new)
            .unwrap_or_default();
        Some(VendorApiError { errcode, errmsg })
    }
}

/// Response deserialization errors
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DecodeError {
    /// JSON deserialization failed
    #[error("Failed to deserialize JSON: {0}")]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),
    /// Reading a streamed body failed
    #[error("Failed to read response body: {0}")]
    Body(
        #[from]
        #[source]
        crate::stream::StreamError,
    ),
}

/// HTTP error response (non-2xx status codes)
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub struct HttpError {
    /// HTTP status code
    pub status: http::StatusCode,
    /// Response body if available
    pub body: Option<Bytes>,
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(body) = &self.body {
            if let Ok(s) = std::str::from_utf8(body) {
                write!(f, ":\n{}", s)?;
            }
        }
        Ok(())
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(feature = "reqwest-client")]
impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_builder() || e.is_request() {
            Self::InvalidRequest(e.to_string())
        } else {
            Self::Other(Box::new(e))
        }
    }
}
