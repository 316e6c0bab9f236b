//! Authenticated operations: creating a release and uploading its assets.

use super::artifact::ArtifactKind;
use super::authority::GitHubUploadAuthority;
use super::body::RequestBody;
use super::client::{GitHubHttp, GitHubRequest, JSON};
use super::failure::Outcome;
use super::models::CreatedRelease;
use crate::error::ClientBuildError;
use crate::version::VersionNumber;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderValue};
use std::fmt;
use std::path::Path;

/// Credential for GitHub's API.
///
/// Only ever written into the `Authorization` header of outgoing requests;
/// `Debug` output is redacted and there is no `Display`.
#[derive(Clone)]
pub struct GitHubToken {
    authorization: HeaderValue,
}

impl GitHubToken {
    /// Wrap a personal access or installation token
    pub fn new(token: &str) -> Result<Self, ClientBuildError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ClientBuildError::InvalidHeader {
                name: "authorization",
            })?;
        authorization.set_sensitive(true);
        Ok(Self { authorization })
    }
}

impl fmt::Debug for GitHubToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GitHubToken(<redacted>)")
    }
}

/// Identifier of a created release
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseId(String);

impl ReleaseId {
    /// Wrap an identifier returned by GitHub
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as sent in upload paths
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// [`GitHubHttp`] carrying a token, for operations that change the repository
#[derive(Debug, Clone)]
pub struct PrivilegedGitHub {
    http: GitHubHttp,
    upload: GitHubUploadAuthority,
    token: GitHubToken,
}

impl GitHubHttp {
    /// Authenticated client uploading assets to `upload`
    pub fn privileged(&self, upload: GitHubUploadAuthority, token: GitHubToken) -> PrivilegedGitHub {
        PrivilegedGitHub {
            http: self.clone(),
            upload,
            token,
        }
    }
}

impl PrivilegedGitHub {
    /// The unauthenticated client underneath
    pub fn http(&self) -> &GitHubHttp {
        &self.http
    }

    /// Create a release tagged with `version`.
    ///
    /// `POST /repos/{owner}/{repo}/releases` with body `{"tag_name":"<version>"}`;
    /// expects `201 Created` and returns the new release's id.
    pub async fn release(&self, version: &VersionNumber) -> Outcome<ReleaseId> {
        let repository = self.http.repository();
        let uri = self.http.api().0.url(
            &["repos", repository.owner(), repository.name(), "releases"],
            &[],
        );
        let payload = serde_json::json!({ "tag_name": version.to_string() }).to_string();

        let request = GitHubRequest::post(uri)
            .header(header::AUTHORIZATION, self.token.authorization.clone())
            .header(header::CONTENT_TYPE, HeaderValue::from_static(JSON))
            .body(RequestBody::Bytes(Bytes::from(payload)));

        let response = self.http.send(request, StatusCode::CREATED).await?;
        let created: CreatedRelease = response.json()?;
        Ok(ReleaseId(created.id.to_string()))
    }

    /// Upload the file at `path` to a release as `target_name`, shown as `label`.
    ///
    /// Streams the file to the upload authority with an explicit
    /// `Content-Length`; expects `201 Created`.
    pub async fn upload_artifact(
        &self,
        release: &ReleaseId,
        target_name: &str,
        label: &str,
        path: &Path,
    ) -> Outcome<()> {
        let repository = self.http.repository();
        let uri = self.upload.0.url(
            &[
                "repos",
                repository.owner(),
                repository.name(),
                "releases",
                release.as_str(),
                "assets",
            ],
            &[("name", target_name), ("label", label)],
        );
        let kind = ArtifactKind::from_file_name(target_name);

        let request = GitHubRequest::post(uri)
            .header(header::AUTHORIZATION, self.token.authorization.clone())
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static(kind.content_type()),
            )
            .body(RequestBody::File(path.to_path_buf()));

        self.http.send(request, StatusCode::CREATED).await?;
        Ok(())
    }
}
