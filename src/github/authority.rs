//! Locations of the GitHub API and upload servers, and the repository a
//! release belongs to.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

/// Host of the production GitHub REST API
pub const PRODUCTION_API_HOST: &str = "api.github.com";

/// Host of the production GitHub asset upload service
pub const PRODUCTION_UPLOAD_HOST: &str = "uploads.github.com";

/// Rejected authority or repository input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Not a bare `host[:port]`
    #[error("Invalid authority '{input}': {reason}")]
    InvalidAuthority {
        /// Rejected input
        input: String,
        /// Reason for the error
        reason: String,
    },

    /// Not `owner/name`
    #[error("Invalid repository '{input}'. Expected: owner/repo")]
    InvalidRepository {
        /// Rejected input
        input: String,
    },
}

/// A server location: host and optional port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Authority {
    base: Url,
}

impl Authority {
    /// Create an authority from a host and optional port
    pub fn new(host: &str, port: Option<u16>) -> Result<Self, AddressError> {
        match port {
            Some(port) => format!("{host}:{port}").parse(),
            None => host.parse(),
        }
    }

    /// Host name or address
    pub fn host(&self) -> &str {
        self.base.host_str().unwrap_or_default()
    }

    /// Explicit port, if any (443 is normalised away)
    pub fn port(&self) -> Option<u16> {
        self.base.port()
    }

    /// `https` URL on this authority with the given path segments and query.
    ///
    /// Segments and query values are percent-encoded.
    pub(crate) fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.clear().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }
}

impl FromStr for Authority {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| AddressError::InvalidAuthority {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        if s.is_empty() || s.contains(['/', '?', '#', '@']) {
            return Err(invalid("expected host[:port]"));
        }

        let base = Url::parse(&format!("https://{s}/")).map_err(|e| invalid(&e.to_string()))?;
        if base.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host"));
        }

        Ok(Self { base })
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port() {
            Some(port) => write!(f, "{}:{}", self.host(), port),
            None => f.write_str(self.host()),
        }
    }
}

/// Authority serving GitHub's metadata API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubApiAuthority(pub Authority);

/// Authority accepting release asset uploads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubUploadAuthority(pub Authority);

/// Repository coordinates: `owner/name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    owner: String,
    name: String,
}

impl Repository {
    /// Create repository coordinates
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Repository owner (user or organisation)
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for Repository {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(AddressError::InvalidRepository {
                input: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
