#![allow(dead_code)]

use std::cell::RefCell;
use std::path::PathBuf;

use covsummary::error::Result;
use covsummary::github::{CheckRun, Comment, Head, HostApi, NewCheck, PullRequest};
use tempfile::TempDir;

/// Requests recorded by [`FakeApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateComment(u64, String),
    UpdateComment(u64, String),
    CreateCheck(NewCheck),
}

/// In-memory stand-in for the GitHub API.
#[derive(Default)]
pub struct FakeApi {
    pub pulls: Vec<PullRequest>,
    pub changed_files: Vec<String>,
    pub comments: Vec<Comment>,
    pub calls: RefCell<Vec<Call>>,
}

pub fn pull(number: u64, sha: &str) -> PullRequest {
    PullRequest {
        number,
        head: Head {
            sha: sha.to_string(),
        },
    }
}

impl HostApi for FakeApi {
    fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        Ok(self
            .pulls
            .iter()
            .find(|p| p.number == number)
            .cloned()
            .unwrap_or_else(|| pull(number, "")))
    }

    fn list_open_pull_requests(&self) -> Result<Vec<PullRequest>> {
        Ok(self.pulls.clone())
    }

    fn list_changed_files(&self, _number: u64) -> Result<Vec<String>> {
        Ok(self.changed_files.clone())
    }

    fn list_comments(&self, _number: u64) -> Result<Vec<Comment>> {
        Ok(self.comments.clone())
    }

    fn create_comment(&self, number: u64, body: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(Call::CreateComment(number, body.to_string()));
        Ok(())
    }

    fn update_comment(&self, comment_id: u64, body: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(Call::UpdateComment(comment_id, body.to_string()));
        Ok(())
    }

    fn create_check(&self, check: &NewCheck) -> Result<CheckRun> {
        self.calls.borrow_mut().push(Call::CreateCheck(check.clone()));
        Ok(CheckRun {
            html_url: Some("https://github.com/o/r/runs/1".to_string()),
        })
    }
}

pub const SAMPLE_REPORT: &str = r#"{
    "total_percent": 82.5,
    "line_percent": 85.0,
    "branch_percent": 70.0,
    "valid_lines": 40,
    "covered_lines": 34,
    "valid_branches": 10,
    "covered_branches": 7,
    "files": [
        {"filename": "src/app.py", "total_percent": 90.0, "line_percent": 92.0,
         "branch_percent": 80.0, "missing": [[12, 12]]},
        {"filename": "src/util.py", "total_percent": 79.9, "line_percent": 80.0,
         "branch_percent": 50.0, "missing": [[3, 4], [20, 20]]}
    ]
}"#;

/// Write `content` to `name` inside a fresh temporary directory.
/// The caller must hold onto `TempDir` to keep the file alive.
pub fn write_fixture(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    (dir, path)
}
