//! Outcome of a GitHub operation and the closed set of ways it can fail.

use crate::error::VersionError;
use reqwest::StatusCode;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Result of one GitHub operation: the operation's value or a classified failure.
pub type Outcome<T> = std::result::Result<T, Failure>;

/// Response headers as `(lower-case name, value)` pairs in received order.
pub type Headers = Vec<(String, String)>;

/// Cause of an exchange that ended without a complete response.
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// Reported by the HTTP transport (DNS, TCP, TLS, truncated response)
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The artifact to upload could not be read
    #[error("Failed to read artifact {path}: {source}")]
    Artifact {
        /// Artifact path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Response headers did not arrive in time after the request was sent
    #[error("No response within {0:?} of sending the request")]
    FirstByteTimedOut(Duration),

    /// The exchange as a whole ran out of time
    #[error("Exchange not complete within {0:?}")]
    EndToEndTimedOut(Duration),
}

/// Why a complete response with the expected status could not be used.
#[derive(Error, Debug)]
pub enum ResponseError {
    /// Body is not JSON, or not JSON of the expected shape
    #[error("Unexpected response body: {0}")]
    Json(#[from] serde_json::Error),

    /// Body names a tag that is not a version number
    #[error("Unexpected release tag: {0}")]
    Version(#[from] VersionError),
}

/// Classified failure of a GitHub exchange.
///
/// Variants are mutually exclusive. `InvalidResponseCode` and
/// `ResponseHandling` mean a complete response arrived; every other variant
/// means none did.
#[derive(Error, Debug, Clone)]
pub enum Failure {
    /// The request could not be submitted or its response not read
    #[error("Request to {uri} failed: {cause}")]
    RequestSubmitting {
        /// Request URI
        uri: Url,
        /// Underlying error
        #[source]
        cause: Arc<ExchangeError>,
    },

    /// No connection within the connect budget
    #[error("Connecting for {uri} timed out after {duration:?}")]
    ConnectTimeout {
        /// Request URI
        uri: Url,
        /// Configured connect timeout
        duration: Duration,
        /// Underlying error
        #[source]
        cause: Arc<ExchangeError>,
    },

    /// No response within the first-byte budget after sending the request
    #[error("No response from {uri} within {duration:?} of sending the request")]
    FirstByteTimeout {
        /// Request URI
        uri: Url,
        /// Configured first-byte timeout
        duration: Duration,
        /// Underlying error
        #[source]
        cause: Arc<ExchangeError>,
    },

    /// The whole exchange exceeded its budget
    #[error("Exchange with {uri} did not complete within {duration:?}")]
    EndToEndTimeout {
        /// Request URI
        uri: Url,
        /// Configured end-to-end timeout
        duration: Duration,
        /// Underlying error
        #[source]
        cause: Arc<ExchangeError>,
    },

    /// The server answered with a status other than the expected one
    #[error("{uri} responded {actual}, expected {expected}: {body}")]
    InvalidResponseCode {
        /// Request URI
        uri: Url,
        /// Status the operation expects
        expected: StatusCode,
        /// Status received
        actual: StatusCode,
        /// Response headers
        headers: Headers,
        /// Response body
        body: String,
    },

    /// The expected status arrived but its body could not be interpreted
    #[error("Failed to handle {status} response from {uri}: {cause}")]
    ResponseHandling {
        /// Request URI
        uri: Url,
        /// Status received
        status: StatusCode,
        /// Response headers
        headers: Headers,
        /// Response body
        body: String,
        /// Underlying error
        #[source]
        cause: Arc<ResponseError>,
    },
}

impl Failure {
    /// URI of the request that failed
    pub fn uri(&self) -> &Url {
        match self {
            Failure::RequestSubmitting { uri, .. }
            | Failure::ConnectTimeout { uri, .. }
            | Failure::FirstByteTimeout { uri, .. }
            | Failure::EndToEndTimeout { uri, .. }
            | Failure::InvalidResponseCode { uri, .. }
            | Failure::ResponseHandling { uri, .. } => uri,
        }
    }

    /// Whether a complete response was received before failing
    pub fn received_response(&self) -> bool {
        matches!(
            self,
            Failure::InvalidResponseCode { .. } | Failure::ResponseHandling { .. }
        )
    }

    /// Transport-level cause, for failures where no response arrived
    pub fn exchange_error(&self) -> Option<&ExchangeError> {
        match self {
            Failure::RequestSubmitting { cause, .. }
            | Failure::ConnectTimeout { cause, .. }
            | Failure::FirstByteTimeout { cause, .. }
            | Failure::EndToEndTimeout { cause, .. } => Some(cause),
            _ => None,
        }
    }
}
