//! Step outputs consumed by later workflow steps.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::debug;
use uuid::Uuid;

use crate::error::{CovsummaryError, Result};

pub trait OutputSink {
    fn set_output(&mut self, name: &str, value: &str) -> Result<()>;
}

/// Appends outputs to the file named by `GITHUB_OUTPUT`.
pub struct GithubOutputFile {
    path: PathBuf,
}

impl GithubOutputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Option<Self> {
        std::env::var_os("GITHUB_OUTPUT").map(Self::new)
    }
}

/// One output entry; multi-line values use the heredoc form with a fresh
/// random delimiter.
pub fn format_entry(name: &str, value: &str) -> Result<String> {
    if !value.contains('\n') && !value.contains('\r') {
        return Ok(format!("{name}={value}\n"));
    }
    let delimiter = format!("ghadelimiter_{}", Uuid::new_v4().simple());
    format_heredoc(name, value, &delimiter)
}

fn format_heredoc(name: &str, value: &str, delimiter: &str) -> Result<String> {
    if name.contains(delimiter) || value.contains(delimiter) {
        return Err(CovsummaryError::OutputDelimiter(name.to_string()));
    }
    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
}

impl OutputSink for GithubOutputFile {
    fn set_output(&mut self, name: &str, value: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format_entry(name, value)?.as_bytes())?;
        Ok(())
    }
}

/// Keeps outputs in memory; used outside of Actions and in tests.
#[derive(Debug, Default)]
pub struct MemoryOutputs {
    pub values: Vec<(String, String)>,
}

impl MemoryOutputs {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl OutputSink for MemoryOutputs {
    fn set_output(&mut self, name: &str, value: &str) -> Result<()> {
        debug!(name, "output set");
        self.values.push((name.to_string(), value.to_string()));
        Ok(())
    }
}
