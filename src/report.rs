//! Markdown rendering of coverage reports.
//!
//! The document has one titled table per report followed by a footer:
//!
//! ```text
//! <strong>Coverage Report</strong>
//!
//! | File | Coverage |   |
//! | - | :-: | :-: |
//! | **All files** | `78%` | :x: |
//! | foo.py | `80%` | :white_check_mark: |
//! | bar.py | `75%` | :x: |
//!
//! _Minimum allowed coverage is `80%`_
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::changes::filter_files;
use crate::model::{floor_percent, CoverageReport, FileCoverage};
use crate::ranges::format_missing_lines;
use crate::stats::passes;

/// Attribution line embedded in every rendered document. Together with the
/// report title it identifies a previously posted comment.
pub const CREDITS: &str = "Generated by :monkey: covsummary";

pub const DEFAULT_REPORT_NAME: &str = "Coverage Report";

const PASS: &str = ":white_check_mark:";
const FAIL: &str = ":x:";

/// Characters with meaning in markdown table cells.
static MARKDOWN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\\`*_~|<>\[\]])").unwrap());

/// Backslash-escape markdown-significant characters.
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    MARKDOWN_RE.replace_all(text, r"\$1").into_owned()
}

/// Escape a file label for a table cell; line breaks would split the row.
fn cell_label(text: &str) -> String {
    escape_markdown(&text.replace("\r\n", " ").replace(['\r', '\n'], " "))
}

/// Display toggles and labels for [`render`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub minimum_coverage: u32,
    pub show_line: bool,
    pub show_branch: bool,
    pub show_class_names: bool,
    pub show_missing: bool,
    /// Budget for the missing column's range text; `<= 0` is unbounded.
    pub show_missing_max_length: i64,
    pub link_missing_lines: bool,
    /// When set, only these filenames are rendered.
    pub filtered_files: Option<HashSet<String>>,
    pub report_name: Option<String>,
    pub header_text: Option<String>,
    /// Turns the "All files" label into a link.
    pub coverage_url: Option<String>,
    /// Repository web root, e.g. `https://github.com/owner/repo`. Needed for
    /// missing-line links.
    pub file_url_base: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            minimum_coverage: 100,
            show_line: false,
            show_branch: false,
            show_class_names: false,
            show_missing: false,
            show_missing_max_length: -1,
            link_missing_lines: false,
            filtered_files: None,
            report_name: None,
            header_text: None,
            coverage_url: None,
            file_url_base: None,
        }
    }
}

impl RenderOptions {
    #[must_use]
    pub fn report_name(&self) -> &str {
        self.report_name.as_deref().unwrap_or(DEFAULT_REPORT_NAME)
    }

    fn status(&self, percent: f64) -> &'static str {
        if passes(percent, self.minimum_coverage) {
            PASS
        } else {
            FAIL
        }
    }

    fn file_url(&self, commit: &str, filename: &str) -> Option<String> {
        let base = self.file_url_base.as_deref()?;
        Some(format!(
            "{}/blob/{commit}/{filename}",
            base.trim_end_matches('/')
        ))
    }
}

/// A table row; `None` cells belong to hidden columns and are dropped.
type Row = Vec<Option<String>>;

fn format_row(row: &Row) -> String {
    let cells: Vec<&str> = row.iter().flatten().map(String::as_str).collect();
    format!("| {} |", cells.join(" | "))
}

fn percent_cell(percent: f64) -> String {
    format!("`{}%`", floor_percent(percent))
}

fn file_row(file: &FileCoverage, commit: &str, options: &RenderOptions) -> Row {
    let missing = options.show_missing.then(|| {
        let url = options.file_url(commit, &file.filename);
        format_missing_lines(
            url.as_deref(),
            &file.missing,
            options.show_missing_max_length,
            options.link_missing_lines,
        )
    });
    vec![
        Some(cell_label(file.label(options.show_class_names))),
        Some(percent_cell(file.total_percent)),
        options.show_line.then(|| percent_cell(file.line_percent)),
        options.show_branch.then(|| percent_cell(file.branch_percent)),
        Some(options.status(file.total_percent).to_string()),
        missing,
    ]
}

fn report_table(report: &CoverageReport, commit: &str, options: &RenderOptions) -> String {
    let column = |show: bool, text: &str| show.then(|| text.to_string());

    let header = vec![
        Some("File".to_string()),
        Some("Coverage".to_string()),
        column(options.show_line, "Lines"),
        column(options.show_branch, "Branches"),
        Some(" ".to_string()),
        column(options.show_missing, "Missing"),
    ];
    let separator = vec![
        Some("-".to_string()),
        Some(":-:".to_string()),
        column(options.show_line, ":-:"),
        column(options.show_branch, ":-:"),
        Some(":-:".to_string()),
        column(options.show_missing, ":-:"),
    ];
    let all_files = match options.coverage_url.as_deref() {
        Some(url) => format!("[All files]({url})"),
        None => "**All files**".to_string(),
    };
    let summary = vec![
        Some(all_files),
        Some(percent_cell(report.total_percent)),
        options.show_line.then(|| percent_cell(report.line_percent)),
        options.show_branch.then(|| percent_cell(report.branch_percent)),
        Some(options.status(report.total_percent).to_string()),
        column(options.show_missing, " "),
    ];

    let mut rows = vec![header, separator, summary];
    rows.extend(
        filter_files(&report.files, options.filtered_files.as_ref())
            .into_iter()
            .map(|file| file_row(file, commit, options)),
    );

    rows.iter().map(format_row).collect::<Vec<_>>().join("\n")
}

/// Render all reports into a single markdown document.
///
/// The output only depends on the arguments: reports and files keep their
/// input order and percentages are floored, never rounded.
#[must_use]
pub fn render(reports: &[CoverageReport], commit: &str, options: &RenderOptions) -> String {
    let mut out = String::new();
    for report in reports {
        let folder = if reports.len() <= 1 {
            String::new()
        } else {
            format!(" {}", report.folder)
        };
        if let Some(header) = options.header_text.as_deref() {
            out.push_str(header);
            out.push_str("\n\n");
        }
        out.push_str(&format!(
            "<strong>{}{folder}</strong>\n\n",
            options.report_name()
        ));
        out.push_str(&report_table(report, commit, options));
        out.push_str("\n\n");
    }
    out.push_str(&format!(
        "_Minimum allowed coverage is `{}%`_\n\n",
        options.minimum_coverage
    ));
    out.push_str(&format!(
        "<p align=\"right\">{CREDITS} against {commit} </p>"
    ));
    out
}
