//! Normalized, format-independent coverage data. A coverage source produces
//! a list of `CoverageReport` which is then aggregated and rendered.

use serde::{Deserialize, Serialize};

/// Truncate a percentage to a whole number. Coverage figures are never
/// rounded up, so 99.9% is shown (and compared) as 99%.
#[must_use]
pub fn floor_percent(value: f64) -> i64 {
    value.floor() as i64
}

/// A closed interval of consecutive uncovered source lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct MissingRange {
    pub start: u32,
    pub end: u32,
}

impl MissingRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn line(line: u32) -> Self {
        Self::new(line, line)
    }

    #[must_use]
    pub fn is_single(&self) -> bool {
        self.start == self.end
    }
}

impl From<(u32, u32)> for MissingRange {
    fn from((start, end): (u32, u32)) -> Self {
        Self { start, end }
    }
}

impl From<MissingRange> for (u32, u32) {
    fn from(range: MissingRange) -> Self {
        (range.start, range.end)
    }
}

/// Coverage figures for a single source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileCoverage {
    /// Path relative to the repository root.
    pub filename: String,
    /// Alternate label, e.g. a fully-qualified class name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub total_percent: f64,
    pub line_percent: f64,
    pub branch_percent: f64,
    /// Uncovered line ranges, sorted and already merged.
    #[serde(default)]
    pub missing: Vec<MissingRange>,
}

impl FileCoverage {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    /// Label shown in the file column.
    #[must_use]
    pub fn label(&self, class_names: bool) -> &str {
        match (&self.display_name, class_names) {
            (Some(name), true) => name,
            _ => &self.filename,
        }
    }
}

/// One coverage run (a coverage file or a folder of them).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    #[serde(default)]
    pub folder: String,
    pub total_percent: f64,
    pub line_percent: f64,
    pub branch_percent: f64,
    pub valid_lines: u64,
    pub covered_lines: u64,
    pub valid_branches: u64,
    pub covered_branches: u64,
    #[serde(default)]
    pub files: Vec<FileCoverage>,
}

impl CoverageReport {
    pub fn new(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            ..Default::default()
        }
    }
}
