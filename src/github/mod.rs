//! HTTPS client for GitHub's release API.
//!
//! [`GitHubHttp`] performs single exchanges under connect, first-byte and
//! end-to-end budgets and reads the latest release; [`PrivilegedGitHub`] adds
//! a token to create releases and upload assets. Every operation returns an
//! [`Outcome`] and reports one [`AuditEvent`] to the configured [`Auditor`].

mod artifact;
mod audit;
mod authority;
mod body;
mod client;
mod failure;
mod models;
mod privileged;

pub use artifact::ArtifactKind;
pub use audit::{AuditEvent, Auditor, LoggingAuditor, NoopAuditor, RecordingAuditor};
pub use authority::{
    AddressError, Authority, GitHubApiAuthority, GitHubUploadAuthority, PRODUCTION_API_HOST,
    PRODUCTION_UPLOAD_HOST, Repository,
};
pub use body::RequestBody;
pub use client::{
    GITHUB_API_VERSION, GitHubHttp, GitHubRequest, ResponseEnvelope, Timeouts, USER_AGENT,
};
pub use failure::{ExchangeError, Failure, Headers, Outcome, ResponseError};
pub use privileged::{GitHubToken, PrivilegedGitHub, ReleaseId};
