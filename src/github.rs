//! GitHub API helpers for posting coverage comments and check runs.
//!
//! Everything the pipeline needs from the hosting service goes through the
//! [`HostApi`] trait so the rendering side never touches the network.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CovsummaryError, Result};
use crate::report::CREDITS;

const API_VERSION: &str = "2022-11-28";
const PER_PAGE: u32 = 100;

/// Repository and run information from the GitHub Actions environment.
#[derive(Debug, Clone)]
pub struct Context {
    /// `owner/name`.
    pub repo: String,
    /// Commit the workflow run was triggered for.
    pub sha: Option<String>,
    /// JSON file holding the triggering event payload.
    pub event_path: Option<String>,
    pub api_url: String,
    pub server_url: String,
}

impl Context {
    /// Build a context from standard GitHub Actions environment variables
    /// (`GITHUB_REPOSITORY`, `GITHUB_SHA`, `GITHUB_EVENT_PATH`,
    /// `GITHUB_API_URL`, `GITHUB_SERVER_URL`).
    pub fn from_env() -> Result<Self> {
        let repo = required_env("GITHUB_REPOSITORY")?;
        Ok(Self {
            repo,
            sha: std::env::var("GITHUB_SHA").ok(),
            event_path: std::env::var("GITHUB_EVENT_PATH").ok(),
            api_url: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            server_url: std::env::var("GITHUB_SERVER_URL")
                .unwrap_or_else(|_| "https://github.com".to_string()),
        })
    }

    /// Web root of the repository, used to build file links.
    #[must_use]
    pub fn repository_url(&self) -> String {
        format!("{}/{}", self.server_url.trim_end_matches('/'), self.repo)
    }
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CovsummaryError::MissingEnv(name.to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Head {
    pub sha: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub head: Head,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub body: Option<String>,
}

#[derive(Deserialize)]
struct ChangedFile {
    filename: String,
}

/// Overall result attached to a check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Conclusion {
    Success,
    Failure,
    Neutral,
}

impl Conclusion {
    /// Neutral unless threshold failures should fail the check.
    #[must_use]
    pub fn for_threshold(fail_below_threshold: bool, below_threshold: bool) -> Self {
        match (fail_below_threshold, below_threshold) {
            (false, _) => Conclusion::Neutral,
            (true, true) => Conclusion::Failure,
            (true, false) => Conclusion::Success,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutput {
    pub title: String,
    pub summary: String,
}

/// Body of a "create check run" request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCheck {
    pub name: String,
    pub head_sha: String,
    pub status: &'static str,
    pub conclusion: Conclusion,
    pub output: CheckOutput,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CheckRun {
    pub html_url: Option<String>,
}

/// Operations the pipeline performs against the hosting service.
pub trait HostApi {
    fn get_pull_request(&self, number: u64) -> Result<PullRequest>;

    fn list_open_pull_requests(&self) -> Result<Vec<PullRequest>>;

    /// Paths touched by a pull request.
    fn list_changed_files(&self, number: u64) -> Result<Vec<String>>;

    fn list_comments(&self, number: u64) -> Result<Vec<Comment>>;

    fn create_comment(&self, number: u64, body: &str) -> Result<()>;

    fn update_comment(&self, comment_id: u64, body: &str) -> Result<()>;

    fn create_check(&self, check: &NewCheck) -> Result<CheckRun>;
}

/// Whether a comment was newly posted or an earlier one was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    Created,
    Updated(u64),
}

/// Find a previous coverage comment: it carries the credits line and, when a
/// report name is configured, that report's title.
#[must_use]
pub fn find_existing_comment(comments: &[Comment], report_name: Option<&str>) -> Option<u64> {
    // With several reports each title carries a folder suffix after the name.
    let titles = report_name.map(|name| {
        [
            format!("<strong>{name}</strong>"),
            format!("<strong>{name} "),
        ]
    });
    comments
        .iter()
        .find(|c| {
            c.body.as_deref().is_some_and(|body| {
                body.contains(CREDITS)
                    && titles
                        .as_ref()
                        .map_or(true, |ts| ts.iter().any(|t| body.contains(t.as_str())))
            })
        })
        .map(|c| c.id)
}

/// Create or update the coverage comment on a pull request.
pub fn upsert_comment(
    api: &dyn HostApi,
    pr_number: u64,
    body: &str,
    report_name: Option<&str>,
) -> Result<CommentAction> {
    let comments = api.list_comments(pr_number)?;
    match find_existing_comment(&comments, report_name) {
        Some(id) => {
            api.update_comment(id, body)?;
            info!(comment_id = id, "PR comment updated");
            Ok(CommentAction::Updated(id))
        }
        None => {
            api.create_comment(pr_number, body)?;
            info!(pr = pr_number, "PR comment created");
            Ok(CommentAction::Created)
        }
    }
}

/// Post a completed check run carrying the rendered report.
pub fn post_check(
    api: &dyn HostApi,
    body: &str,
    report_name: Option<&str>,
    sha: &str,
    conclusion: Conclusion,
) -> Result<CheckRun> {
    let name = report_name.unwrap_or("coverage").to_string();
    let check = NewCheck {
        name: name.clone(),
        head_sha: sha.to_string(),
        status: "completed",
        conclusion,
        output: CheckOutput {
            title: name,
            summary: body.to_string(),
        },
    };
    let run = api.create_check(&check)?;
    info!(url = run.html_url.as_deref().unwrap_or(""), "Check run created");
    Ok(run)
}

/// Blocking GitHub REST client.
pub struct GitHubClient {
    token: String,
    repo: String,
    api_url: String,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>, context: &Context) -> Self {
        Self {
            token: token.into(),
            repo: context.repo.clone(),
            api_url: context.api_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}", self.api_url, self.repo, path)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        ureq::request(method, url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", "covsummary")
            .set("X-GitHub-Api-Version", API_VERSION)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self.request("GET", url).call().map_err(api_error)?;
        resp.into_json().map_err(CovsummaryError::Io)
    }

    fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let resp = self
            .request(method, url)
            .send_json(body)
            .map_err(api_error)?;
        resp.into_json().map_err(CovsummaryError::Io)
    }

    /// Fetch every page of a list endpoint.
    fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();
        let mut page = 1u32;
        loop {
            let url = format!(
                "{}{separator}per_page={PER_PAGE}&page={page}",
                self.url(path)
            );
            let batch: Vec<T> = self.get_json(&url)?;
            let done = batch.len() < PER_PAGE as usize;
            items.extend(batch);
            if done {
                break;
            }
            page += 1;
        }
        Ok(items)
    }
}

fn api_error(err: ureq::Error) -> CovsummaryError {
    match err {
        ureq::Error::Status(status, resp) => CovsummaryError::Api {
            status,
            body: resp.into_string().unwrap_or_default(),
        },
        other => CovsummaryError::Transport(other.to_string()),
    }
}

impl HostApi for GitHubClient {
    fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        self.get_json(&self.url(&format!("pulls/{number}")))
    }

    fn list_open_pull_requests(&self) -> Result<Vec<PullRequest>> {
        self.get_all("pulls?state=open")
    }

    fn list_changed_files(&self, number: u64) -> Result<Vec<String>> {
        let files: Vec<ChangedFile> = self.get_all(&format!("pulls/{number}/files"))?;
        Ok(files.into_iter().map(|f| f.filename).collect())
    }

    fn list_comments(&self, number: u64) -> Result<Vec<Comment>> {
        self.get_all(&format!("issues/{number}/comments"))
    }

    fn create_comment(&self, number: u64, body: &str) -> Result<()> {
        let _: Comment = self.send_json(
            "POST",
            &self.url(&format!("issues/{number}/comments")),
            &serde_json::json!({ "body": body }),
        )?;
        Ok(())
    }

    fn update_comment(&self, comment_id: u64, body: &str) -> Result<()> {
        let _: Comment = self.send_json(
            "PATCH",
            &self.url(&format!("issues/comments/{comment_id}")),
            &serde_json::json!({ "body": body }),
        )?;
        Ok(())
    }

    fn create_check(&self, check: &NewCheck) -> Result<CheckRun> {
        self.send_json("POST", &self.url("check-runs"), check)
    }
}
