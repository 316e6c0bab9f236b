//! # gh_release_client
//!
//! Publishes releases to GitHub over HTTPS from unattended build pipelines.
//!
//! Every exchange with GitHub runs under three budgets (connect, first byte,
//! end to end), pins its TLS trust to GitHub's certificate authorities, and
//! ends in exactly one [`github::Outcome`] and one [`github::AuditEvent`].
//!
//! ## Usage
//!
//! ```bash
//! gh_release --repo owner/name --artifact target/app.jar::app.jar::Application
//! gh_release --repo owner/name --version 4.17
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod error;
pub mod github;
pub mod pki;
pub mod version;
pub mod workflow;

pub use error::{CliError, ReleaseError, Result};
pub use github::{
    AuditEvent, Auditor, Failure, GitHubHttp, GitHubToken, Outcome, PrivilegedGitHub, ReleaseId,
    Timeouts,
};
pub use pki::ReleaseTrustStore;
pub use version::VersionNumber;
pub use workflow::{Artifact, PublishedRelease, ReleaseWorkflow, VersionPlan};
