//! Shapes of the GitHub JSON documents the client reads.

use serde::Deserialize;

/// Element of `GET /repos/{owner}/{repo}/releases`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ReleaseSummary {
    pub tag_name: String,
}

/// Response to `POST /repos/{owner}/{repo}/releases`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedRelease {
    pub id: u64,
}
