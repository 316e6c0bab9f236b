//! Error types for gh_release_client operations.
//!
//! Exchange-level failures live in [`crate::github::Failure`]; this module holds
//! everything around them: version handling, trust configuration, client
//! construction, the CLI and the top-level [`ReleaseError`].

use crate::github::Failure;
use thiserror::Error;

/// Result type alias for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Version handling errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Trust store errors
    #[error("Trust store error: {0}")]
    TrustStore(#[from] TrustStoreError),

    /// HTTP client construction errors
    #[error("Client error: {0}")]
    Client(#[from] ClientBuildError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// A GitHub exchange failed; the release attempt stops here
    #[error("GitHub error while {step}: {failure}")]
    GitHub {
        /// Workflow step that was running
        step: String,
        /// Classified failure of the exchange
        failure: Failure,
    },
}

/// Version handling errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Version string is not `<major>.<minor>`
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion {
        /// Version string
        version: String,
        /// Reason for the error
        reason: String,
    },

    /// Development versions are never published
    #[error("Cannot release development version")]
    DevelopmentVersion,
}

/// Trust store construction errors
#[derive(Error, Debug)]
pub enum TrustStoreError {
    /// PEM input could not be decoded
    #[error("Failed to parse certificates: {0}")]
    Pem(#[from] rustls::pki_types::pem::Error),

    /// PEM input decoded to nothing
    #[error("No certificates found in trust material")]
    NoCertificates,

    /// A decoded certificate was rejected as a trust anchor
    #[error("Failed to add trust anchor: {0}")]
    Anchor(#[source] rustls::Error),

    /// Building the TLS client configuration failed
    #[error("Failed to build TLS configuration: {0}")]
    Tls(#[source] rustls::Error),
}

/// HTTP client construction errors
#[derive(Error, Debug)]
pub enum ClientBuildError {
    /// Trust configuration could not be turned into TLS settings
    #[error(transparent)]
    TrustStore(#[from] TrustStoreError),

    /// The underlying HTTP client rejected its configuration
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// A fixed header value is not a legal header
    #[error("Invalid header value for '{name}'")]
    InvalidHeader {
        /// Header name
        name: &'static str,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Cli(CliError::MissingArgument { argument }) if argument == "token" => {
                vec![
                    "Set GH_TOKEN or GITHUB_TOKEN, or pass --token".to_string(),
                    "Ensure the token has contents:write permission on the repository".to_string(),
                ]
            }
            ReleaseError::Version(VersionError::DevelopmentVersion) => vec![
                "Pass --version <major>.<minor> to release an explicit version".to_string(),
            ],
            ReleaseError::GitHub { failure, .. } => match failure {
                Failure::ConnectTimeout { .. } | Failure::RequestSubmitting { .. } => vec![
                    "Check network connectivity to the GitHub API and upload hosts".to_string(),
                    "Verify the host names passed with --api-host/--upload-host".to_string(),
                ],
                Failure::FirstByteTimeout { .. } | Failure::EndToEndTimeout { .. } => vec![
                    "Raise --first-byte-timeout or --end-to-end-timeout for large artifacts"
                        .to_string(),
                ],
                Failure::InvalidResponseCode { actual, .. } if actual.as_u16() == 401 => vec![
                    "The token was rejected; generate a new one".to_string(),
                ],
                Failure::InvalidResponseCode { actual, .. } if actual.as_u16() == 422 => vec![
                    "A release or asset with this name may already exist".to_string(),
                    "Delete the partial release on GitHub before retrying".to_string(),
                ],
                _ => vec![
                    "Inspect the release on GitHub; partially created releases are not rolled back"
                        .to_string(),
                ],
            },
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Whether the failure happened before GitHub answered, so running again
    /// may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            ReleaseError::GitHub { failure, .. } => !failure.received_response(),
            _ => false,
        }
    }
}
