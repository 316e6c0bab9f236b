//! Publishing a release: pick the version, create the release, upload assets.
//!
//! Steps run strictly in order and the first failure ends the attempt. A
//! release created before a failed upload is left in place.

use crate::error::{ReleaseError, Result, VersionError};
use crate::github::{PrivilegedGitHub, ReleaseId};
use crate::version::VersionNumber;
use std::path::PathBuf;

/// How the version to release is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionPlan {
    /// Release exactly this version
    Explicit(VersionNumber),
    /// Release the minor successor of the latest release, or `first` when the
    /// repository has none
    NextAfterLatest {
        /// Version used for a repository without releases
        first: VersionNumber,
    },
}

/// A file to attach to the release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Local file to upload
    pub path: PathBuf,
    /// Asset name on GitHub
    pub target_name: String,
    /// Asset label shown on the release page
    pub label: String,
}

impl Artifact {
    /// Describe an artifact
    pub fn new(
        path: impl Into<PathBuf>,
        target_name: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            target_name: target_name.into(),
            label: label.into(),
        }
    }
}

/// What a successful run published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRelease {
    /// Released version
    pub version: VersionNumber,
    /// Identifier of the created release
    pub release_id: ReleaseId,
    /// Asset names uploaded, in upload order
    pub uploaded: Vec<String>,
}

/// Sequences the GitHub operations of one release attempt
#[derive(Debug, Clone)]
pub struct ReleaseWorkflow {
    github: PrivilegedGitHub,
}

impl ReleaseWorkflow {
    /// Workflow publishing through `github`
    pub fn new(github: PrivilegedGitHub) -> Self {
        Self { github }
    }

    /// Decide which version to release
    pub async fn resolve_version(&self, plan: &VersionPlan) -> Result<VersionNumber> {
        match plan {
            VersionPlan::Explicit(version) => Ok(*version),
            VersionPlan::NextAfterLatest { first } => {
                let latest = self
                    .github
                    .http()
                    .latest_release_version()
                    .await
                    .map_err(|failure| ReleaseError::GitHub {
                        step: "looking up the latest release".to_string(),
                        failure,
                    })?;

                match latest {
                    Some(latest) => {
                        log::info!("Latest release is {}", latest);
                        Ok(latest.next()?)
                    }
                    None => {
                        log::info!("No previous release, starting at {}", first);
                        Ok(*first)
                    }
                }
            }
        }
    }

    /// Create the release and upload every artifact in order
    pub async fn run(&self, plan: &VersionPlan, artifacts: &[Artifact]) -> Result<PublishedRelease> {
        let version = self.resolve_version(plan).await?;
        if !version.is_release() {
            return Err(VersionError::DevelopmentVersion.into());
        }

        log::info!("Creating release {}", version);
        let release_id =
            self.github
                .release(&version)
                .await
                .map_err(|failure| ReleaseError::GitHub {
                    step: format!("creating release {version}"),
                    failure,
                })?;
        log::info!("Created release {} with id {}", version, release_id);

        let mut uploaded = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            log::info!(
                "Uploading {} as {}",
                artifact.path.display(),
                artifact.target_name
            );
            self.github
                .upload_artifact(
                    &release_id,
                    &artifact.target_name,
                    &artifact.label,
                    &artifact.path,
                )
                .await
                .map_err(|failure| ReleaseError::GitHub {
                    step: format!("uploading {}", artifact.target_name),
                    failure,
                })?;
            uploaded.push(artifact.target_name.clone());
        }

        Ok(PublishedRelease {
            version,
            release_id,
            uploaded,
        })
    }
}
