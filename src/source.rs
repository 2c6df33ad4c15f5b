//! Loading normalized coverage reports from JSON files.
//!
//! Each matched file holds either one report object or an array of them.
//! Reports without a `folder` are labelled with the name of the directory
//! containing the file.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{CovsummaryError, Result};
use crate::model::CoverageReport;

/// Options applied while loading reports.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// Drop files that are already fully covered.
    pub skip_covered: bool,
    /// Prepended to every filename so links resolve from the repository root.
    pub prefix_path: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReportFile {
    Many(Vec<CoverageReport>),
    One(Box<CoverageReport>),
}

/// Load every report from files matching `pattern` (a path or glob).
/// Matches are read in sorted order.
pub fn load_reports(pattern: &str, options: &SourceOptions) -> Result<Vec<CoverageReport>> {
    let mut paths = Vec::new();
    for entry in glob::glob(pattern)? {
        let path = entry?;
        if path.is_file() {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(CovsummaryError::NoCoverageFiles(pattern.to_string()));
    }
    paths.sort();

    let mut reports = Vec::new();
    for path in &paths {
        let loaded = load_file(path, options)?;
        info!(path = %path.display(), reports = loaded.len(), "loaded coverage");
        reports.extend(loaded);
    }
    Ok(reports)
}

/// Load the reports stored in a single JSON file.
pub fn load_file(path: &Path, options: &SourceOptions) -> Result<Vec<CoverageReport>> {
    let content = std::fs::read(path)?;
    let parsed: ReportFile =
        serde_json::from_slice(&content).map_err(|source| CovsummaryError::Json {
            path: path.display().to_string(),
            source,
        })?;
    let mut reports = match parsed {
        ReportFile::Many(reports) => reports,
        ReportFile::One(report) => vec![*report],
    };

    let default_folder = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string();
    for report in &mut reports {
        if report.folder.is_empty() {
            report.folder = default_folder.clone();
        }
        apply_options(report, options);
    }
    Ok(reports)
}

fn apply_options(report: &mut CoverageReport, options: &SourceOptions) {
    if options.skip_covered {
        let before = report.files.len();
        report.files.retain(|f| f.total_percent < 100.0);
        debug!(
            folder = %report.folder,
            skipped = before - report.files.len(),
            "skipped fully covered files"
        );
    }
    if let Some(prefix) = options.prefix_path.as_deref() {
        for file in &mut report.files {
            file.filename = join_prefix(prefix, &file.filename);
        }
    }
}

fn join_prefix(prefix: &str, filename: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let filename = filename.trim_start_matches("./").trim_start_matches('/');
    if prefix.is_empty() {
        filename.to_string()
    } else {
        format!("{prefix}/{filename}")
    }
}
