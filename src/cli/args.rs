//! Command line argument parsing and validation.

use crate::error::CliError;
use crate::github::{Authority, PRODUCTION_API_HOST, PRODUCTION_UPLOAD_HOST, Repository, Timeouts};
use crate::version::VersionNumber;
use crate::workflow::{Artifact, VersionPlan};
use clap::Parser;
use std::collections::HashSet;
use std::time::Duration;

/// Environment variable consulted when neither `--token` nor `GH_TOKEN` is set
pub const FALLBACK_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Publish a release and its artifacts to GitHub
#[derive(Parser, Debug)]
#[command(
    name = "gh_release",
    about = "Publish a release and its artifacts to GitHub",
    disable_version_flag = true,
    long_about = "Create a GitHub release and upload its artifacts.

The version is the minor successor of the latest release unless --version is
given. Artifacts are uploaded in the order given; the first failure stops the
release.

Usage:
  gh_release --repo owner/name --artifact target/app.jar::app.jar::Application
  gh_release --repo owner/name --version 4.17 --artifact notes.txt::NOTES.txt::Notes"
)]
pub struct Args {
    /// Repository to release: owner/name
    #[arg(long, value_name = "OWNER/NAME")]
    pub repo: Repository,

    /// GitHub token with contents:write permission (falls back to GITHUB_TOKEN)
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub API authority
    #[arg(long, value_name = "HOST[:PORT]", default_value = PRODUCTION_API_HOST)]
    pub api_host: Authority,

    /// GitHub upload authority
    #[arg(long, value_name = "HOST[:PORT]", default_value = PRODUCTION_UPLOAD_HOST)]
    pub upload_host: Authority,

    /// Seconds allowed for DNS, TCP connect and TLS handshake
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub connect_timeout: u64,

    /// Seconds allowed between sending a request and its response headers
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub first_byte_timeout: u64,

    /// Seconds allowed for a whole exchange, uploads included
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub end_to_end_timeout: u64,

    /// Release exactly this version instead of the successor of the latest
    #[arg(long, value_name = "MAJOR.MINOR", conflicts_with = "first_version")]
    pub version: Option<VersionNumber>,

    /// Version to use when the repository has no release yet
    #[arg(long, value_name = "MAJOR.MINOR", default_value = "1.0")]
    pub first_version: VersionNumber,

    /// Artifact to upload, repeatable: local path, asset name and label
    #[arg(long = "artifact", value_name = "PATH::NAME::LABEL", value_parser = parse_artifact)]
    pub artifacts: Vec<Artifact>,

    /// Print only errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), CliError> {
        for (name, secs) in [
            ("--connect-timeout", self.connect_timeout),
            ("--first-byte-timeout", self.first_byte_timeout),
            ("--end-to-end-timeout", self.end_to_end_timeout),
        ] {
            if secs == 0 {
                return Err(CliError::InvalidArguments {
                    reason: format!("{name} must be at least one second"),
                });
            }
        }

        let mut names = HashSet::new();
        for artifact in &self.artifacts {
            if !artifact.path.is_file() {
                return Err(CliError::InvalidArguments {
                    reason: format!("Artifact file not found: {}", artifact.path.display()),
                });
            }
            if !names.insert(artifact.target_name.as_str()) {
                return Err(CliError::InvalidArguments {
                    reason: format!("Asset name used twice: {}", artifact.target_name),
                });
            }
        }

        Ok(())
    }

    /// Token from `--token`/`GH_TOKEN`, then `GITHUB_TOKEN`
    pub fn resolve_token(&self) -> Result<String, CliError> {
        self.token
            .clone()
            .or_else(|| std::env::var(FALLBACK_TOKEN_ENV).ok())
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| CliError::MissingArgument {
                argument: "token".to_string(),
            })
    }

    /// Exchange budgets
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_secs(self.connect_timeout),
            first_byte: Duration::from_secs(self.first_byte_timeout),
            end_to_end: Duration::from_secs(self.end_to_end_timeout),
        }
    }

    /// How the released version is chosen
    pub fn version_plan(&self) -> VersionPlan {
        match self.version {
            Some(version) => VersionPlan::Explicit(version),
            None => VersionPlan::NextAfterLatest {
                first: self.first_version,
            },
        }
    }
}

/// Parse `PATH::NAME::LABEL`
fn parse_artifact(value: &str) -> Result<Artifact, String> {
    let mut parts = value.splitn(3, "::");
    match (parts.next(), parts.next(), parts.next()) {
        (Some(path), Some(name), Some(label))
            if !path.is_empty() && !name.is_empty() && !label.is_empty() =>
        {
            Ok(Artifact::new(path, name, label))
        }
        _ => Err(format!("expected PATH::NAME::LABEL, got '{value}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["gh_release", "--repo", "owner/name"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).expect("valid arguments")
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.api_host.host(), PRODUCTION_API_HOST);
        assert_eq!(args.upload_host.host(), PRODUCTION_UPLOAD_HOST);
        assert_eq!(args.timeouts(), Timeouts::default());
        assert_eq!(
            args.version_plan(),
            VersionPlan::NextAfterLatest {
                first: VersionNumber::release(1, 0)
            }
        );
        assert!(args.artifacts.is_empty());
    }

    #[test]
    fn test_explicit_version() {
        let args = parse(&["--version", "4.17"]);
        assert_eq!(
            args.version_plan(),
            VersionPlan::Explicit(VersionNumber::release(4, 17))
        );
    }

    #[test]
    fn test_version_conflicts_with_first_version() {
        let result = Args::try_parse_from([
            "gh_release",
            "--repo",
            "owner/name",
            "--version",
            "4.17",
            "--first-version",
            "2.0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_artifact_label_may_contain_separator() {
        let args = parse(&["--artifact", "build/my.jar::my.jar::Best Jar!::v2"]);
        assert_eq!(
            args.artifacts,
            vec![Artifact {
                path: PathBuf::from("build/my.jar"),
                target_name: "my.jar".to_string(),
                label: "Best Jar!::v2".to_string(),
            }]
        );
    }

    #[test]
    fn test_malformed_artifact_rejected() {
        assert!(parse_artifact("build/my.jar::my.jar").is_err());
        assert!(parse_artifact("::my.jar::label").is_err());
    }

    #[test]
    fn test_invalid_repository_rejected() {
        assert!(Args::try_parse_from(["gh_release", "--repo", "no-slash"]).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let args = parse(&["--first-byte-timeout", "0"]);
        assert!(matches!(
            args.validate(),
            Err(CliError::InvalidArguments { reason }) if reason.contains("--first-byte-timeout")
        ));
    }

    #[test]
    fn test_missing_artifact_file_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("missing.jar");
        let artifact_arg = format!("{}::missing.jar::Missing", missing.display());
        let args = parse(&["--artifact", &artifact_arg]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_duplicate_asset_names_rejected() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let artifact_arg = format!("{}::app.jar::App", file.path().display());
        let args = parse(&["--artifact", &artifact_arg, "--artifact", &artifact_arg]);
        assert!(matches!(
            args.validate(),
            Err(CliError::InvalidArguments { reason }) if reason.contains("app.jar")
        ));
    }
}
