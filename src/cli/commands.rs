//! Execution of the release command.

use super::{Args, OutputManager};
use crate::error::Result;
use crate::github::{
    GitHubApiAuthority, GitHubHttp, GitHubToken, GitHubUploadAuthority, LoggingAuditor,
};
use crate::pki::ReleaseTrustStore;
use crate::workflow::ReleaseWorkflow;
use std::sync::Arc;

/// Run a release as described by `args`, returning the process exit code
pub async fn execute_command(args: Args, output: &OutputManager) -> Result<i32> {
    args.validate()?;
    let token = GitHubToken::new(&args.resolve_token()?)?;

    let trust = ReleaseTrustStore::production()?;
    let http = GitHubHttp::with_auditor(
        GitHubApiAuthority(args.api_host.clone()),
        args.repo.clone(),
        &trust,
        args.timeouts(),
        Arc::new(LoggingAuditor),
    )?;
    let github = http.privileged(GitHubUploadAuthority(args.upload_host.clone()), token);

    let _ = output.section(&format!("Releasing {}", args.repo));
    if args.artifacts.is_empty() {
        let _ = output.warn("No artifacts given; the release will have no assets");
    }
    let _ = output.info(&format!(
        "API {} / uploads {}",
        args.api_host, args.upload_host
    ));

    let published = ReleaseWorkflow::new(github)
        .run(&args.version_plan(), &args.artifacts)
        .await?;

    let _ = output.success(&format!(
        "Released {} (release id {})",
        published.version, published.release_id
    ));
    for name in &published.uploaded {
        let _ = output.indent(name);
    }

    Ok(0)
}
