//! Error types for the Bitmesh client.

use serde_json::Value;
use thiserror::Error;

/// Error reported by an [`HttpTransport`](crate::transport::HttpTransport).
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Every way a call can fail. A call either returns a decoded body or exactly
/// one of these; nothing is retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The request payload could not be serialized. Raised before any
    /// network attempt.
    #[error("failed to encode payload as JSON: {0}")]
    PayloadEncoding(#[source] serde_json::Error),

    /// Connection, TLS or timeout failure reported by the transport.
    #[error("transport error while calling Bitmesh: {0}")]
    Transport(#[source] TransportError),

    /// The response body is not valid JSON.
    #[error("failed to decode Bitmesh response JSON: {source}. Raw body: {raw_body}")]
    ResponseDecode {
        raw_body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The API answered with a status other than 200.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        /// The `error` field of the response body, if any.
        error: Option<Value>,
    },

    /// The request URL could not be parsed.
    #[error("invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// HTTP status of an [`Error::Api`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_api_error(&self) -> bool {
        matches!(self, Error::Api { .. })
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
