//! Working out which pull request and commit a run reports on.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{CovsummaryError, Result};
use crate::github::{Head, HostApi};

/// The subset of a GitHub event payload used to locate the change set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    pub action: Option<String>,
    pub pull_request: Option<PullRequestEvent>,
    pub workflow_run: Option<WorkflowRun>,
    pub release: Option<serde_json::Value>,
    /// Head commit of a push.
    pub after: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestEvent {
    pub number: u64,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub merged: bool,
    pub merge_commit_sha: Option<String>,
    #[serde(default)]
    pub head: Head,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowRun {
    pub head_commit: HeadCommit,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeadCommit {
    pub id: String,
}

impl EventPayload {
    /// Read the payload from `GITHUB_EVENT_PATH`; a missing file yields an
    /// empty payload.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read(path)?;
        serde_json::from_slice(&content).map_err(|source| CovsummaryError::Json {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Pull request and commit a run reports against. Either may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeContext {
    pub pull_request_number: Option<u64>,
    pub commit: Option<String>,
}

/// Resolve the change context, in order of precedence: an explicitly
/// supplied PR number, a `workflow_run` event, a `pull_request` event, a
/// release, and finally a push (`after`).
pub fn resolve(
    api: &dyn HostApi,
    payload: &EventPayload,
    pull_request_number: Option<u64>,
    context_sha: Option<&str>,
) -> Result<ChangeContext> {
    let mut resolved = ChangeContext::default();

    if let Some(number) = pull_request_number {
        info!("Use supplied PR#");
        let pr = api.get_pull_request(number)?;
        resolved.pull_request_number = Some(number);
        resolved.commit = Some(pr.head.sha);
    } else if let Some(run) = &payload.workflow_run {
        let commit = run.head_commit.id.clone();
        info!(commit = %commit, "Find PR# from workflow_run payload");
        resolved.pull_request_number = api
            .list_open_pull_requests()?
            .into_iter()
            .filter(|pr| pr.head.sha == commit)
            .map(|pr| pr.number)
            .last();
        resolved.commit = Some(commit);
    } else if let Some(pr) = &payload.pull_request {
        let action = payload.action.as_deref().unwrap_or("");
        info!(action, state = %pr.state, "Get PR# from pull_request payload");
        if action == "closed" {
            if pr.merged {
                info!("PR was merged");
                resolved.pull_request_number = Some(pr.number);
                resolved.commit = pr.merge_commit_sha.clone();
            } else {
                info!("PR was closed without merging");
            }
        } else {
            resolved.pull_request_number = Some(pr.number);
            resolved.commit = Some(pr.head.sha.clone());
        }
    } else if payload.release.is_some() {
        info!(action = payload.action.as_deref().unwrap_or(""), "Release");
        resolved.commit = context_sha.map(String::from);
    } else if let Some(after) = &payload.after {
        info!("Use payload.after as commit");
        resolved.commit = Some(after.clone());
    }

    resolved.commit = resolved.commit.filter(|c| !c.is_empty());
    info!(
        pr = ?resolved.pull_request_number,
        commit = ?resolved.commit,
        "Resolved change context"
    );
    Ok(resolved)
}
