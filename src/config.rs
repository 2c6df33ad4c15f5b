//! Typed settings read from a key-value input source.
//!
//! In a GitHub Actions step every `with:` input arrives as an
//! `INPUT_<NAME>` environment variable. [`Settings::load`] reads all
//! recognized inputs at once and fails on the first missing or malformed
//! value, before any coverage is loaded.

use std::collections::HashMap;

use crate::error::{CovsummaryError, Result};

/// A source of named string inputs.
pub trait ConfigSource {
    /// Raw value of an input, or `None` when it is unset.
    fn get(&self, name: &str) -> Option<String>;
}

/// Inputs from `INPUT_*` environment variables.
pub struct EnvSource;

impl EnvSource {
    /// Environment variable holding an input: upper-cased, spaces replaced.
    #[must_use]
    pub fn var_name(name: &str) -> String {
        format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
    }
}

impl ConfigSource for EnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(Self::var_name(name)).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

/// Trimmed input value; empty counts as unset.
fn optional(source: &dyn ConfigSource, name: &str) -> Option<String> {
    source
        .get(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(source: &dyn ConfigSource, name: &str) -> Result<String> {
    optional(source, name).ok_or_else(|| CovsummaryError::MissingInput(name.to_string()))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(CovsummaryError::InvalidInput {
            name: name.to_string(),
            value: value.to_string(),
            expected: "true or false",
        }),
    }
}

fn parse_int<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| CovsummaryError::InvalidInput {
        name: name.to_string(),
        value: value.to_string(),
        expected: "an integer",
    })
}

fn required_bool(source: &dyn ConfigSource, name: &str) -> Result<bool> {
    parse_bool(name, &required(source, name)?)
}

fn optional_bool(source: &dyn ConfigSource, name: &str, default: bool) -> Result<bool> {
    match optional(source, name) {
        Some(v) => parse_bool(name, &v),
        None => Ok(default),
    }
}

/// Every recognized input, typed.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub repo_token: String,
    /// Path or glob of normalized coverage JSON files.
    pub path: String,
    pub skip_covered: bool,
    pub show_line: bool,
    pub show_branch: bool,
    pub minimum_coverage: u32,
    pub fail_below_threshold: bool,
    pub show_class_names: bool,
    pub show_missing: bool,
    pub show_missing_max_length: i64,
    pub link_missing_lines: bool,
    pub prefix_path: Option<String>,
    pub only_changed_files: bool,
    pub add_pr_comment: bool,
    pub add_check: bool,
    pub report_name: Option<String>,
    pub header_text: Option<String>,
    pub coverage_url: Option<String>,
    pub pull_request_number: Option<u64>,
}

impl Settings {
    pub fn load(source: &dyn ConfigSource) -> Result<Self> {
        let show_missing_max_length: i64 = match optional(source, "show_missing_max_length") {
            Some(v) => parse_int("show_missing_max_length", &v)?,
            None => -1,
        };
        let pull_request_number: Option<u64> = optional(source, "pull_request_number")
            .map(|v| parse_int("pull_request_number", &v))
            .transpose()?;

        Ok(Self {
            repo_token: required(source, "repo_token")?,
            path: required(source, "path")?,
            skip_covered: required_bool(source, "skip_covered")?,
            show_line: required_bool(source, "show_line")?,
            show_branch: required_bool(source, "show_branch")?,
            minimum_coverage: parse_int(
                "minimum_coverage",
                &required(source, "minimum_coverage")?,
            )?,
            fail_below_threshold: optional_bool(source, "fail_below_threshold", false)?,
            show_class_names: required_bool(source, "show_class_names")?,
            show_missing: required_bool(source, "show_missing")?,
            show_missing_max_length,
            link_missing_lines: optional_bool(source, "link_missing_lines", false)?,
            prefix_path: optional(source, "prefix_path")
                .or_else(|| optional(source, "link_missing_lines_source_dir")),
            only_changed_files: required_bool(source, "only_changed_files")?,
            add_pr_comment: optional_bool(source, "add_pr_comment", true)?,
            add_check: optional_bool(source, "add_check", true)?,
            report_name: optional(source, "report_name"),
            header_text: optional(source, "header_text"),
            coverage_url: optional(source, "coverage_url"),
            pull_request_number,
        })
    }
}
