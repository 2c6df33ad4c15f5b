//! Command handler functions for the covsummary CLI.
//!
//! Handlers return their document as a `String` instead of printing, so they
//! can be tested without capturing stdout.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::info;

use crate::action::{self, Outcome};
use crate::config::{EnvSource, Settings};
use crate::event::EventPayload;
use crate::github::{Context, GitHubClient};
use crate::outputs::{GithubOutputFile, MemoryOutputs, OutputSink};
use crate::report::{self, RenderOptions};
use crate::source::{self, SourceOptions};
use crate::stats::{self, Totals};

/// Options for rendering a report locally.
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Coverage JSON file or glob pattern.
    pub path: String,

    /// Commit the report is generated against.
    #[arg(long, default_value = "HEAD")]
    pub commit: String,

    /// Minimum total coverage percentage.
    #[arg(long, default_value_t = 100)]
    pub minimum_coverage: u32,

    /// Show the line coverage column.
    #[arg(long)]
    pub show_line: bool,

    /// Show the branch coverage column.
    #[arg(long)]
    pub show_branch: bool,

    /// Label files by class name where available.
    #[arg(long)]
    pub show_class_names: bool,

    /// Show missing line ranges.
    #[arg(long)]
    pub show_missing: bool,

    /// Crop missing ranges to this many characters (<= 0 disables cropping).
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub show_missing_max_length: i64,

    /// Link missing ranges to the source (needs --repository-url).
    #[arg(long)]
    pub link_missing_lines: bool,

    /// Repository web root, e.g. https://github.com/owner/repo.
    #[arg(long)]
    pub repository_url: Option<String>,

    /// Omit files that are fully covered.
    #[arg(long)]
    pub skip_covered: bool,

    /// Prefix joined in front of every filename.
    #[arg(long)]
    pub prefix_path: Option<String>,

    /// File listing changed paths, one per line; only these are shown.
    #[arg(long)]
    pub changed_files: Option<PathBuf>,

    /// Report title.
    #[arg(long)]
    pub report_name: Option<String>,

    /// Text placed above each report.
    #[arg(long)]
    pub header_text: Option<String>,

    /// Link for the "All files" row.
    #[arg(long)]
    pub coverage_url: Option<String>,
}

impl RenderArgs {
    fn render_options(&self, filtered_files: Option<HashSet<String>>) -> RenderOptions {
        RenderOptions {
            minimum_coverage: self.minimum_coverage,
            show_line: self.show_line,
            show_branch: self.show_branch,
            show_class_names: self.show_class_names,
            show_missing: self.show_missing,
            show_missing_max_length: self.show_missing_max_length,
            link_missing_lines: self.link_missing_lines,
            filtered_files,
            report_name: self.report_name.clone(),
            header_text: self.header_text.clone(),
            coverage_url: self.coverage_url.clone(),
            file_url_base: self.repository_url.clone(),
        }
    }
}

/// A rendered document and whether any report missed the threshold.
#[derive(Debug)]
pub struct Rendered {
    pub document: String,
    pub below_threshold: bool,
}

/// Read a newline-separated list of paths, ignoring blank lines.
pub fn read_changed_files(path: &Path) -> Result<HashSet<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read changed files from {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

pub fn cmd_render(args: &RenderArgs) -> Result<Rendered> {
    let source_options = SourceOptions {
        skip_covered: args.skip_covered,
        prefix_path: args.prefix_path.clone(),
    };
    let reports = source::load_reports(&args.path, &source_options)
        .with_context(|| format!("Failed to load coverage from '{}'", args.path))?;

    let filtered_files = args
        .changed_files
        .as_deref()
        .map(read_changed_files)
        .transpose()?;

    let document = report::render(&reports, &args.commit, &args.render_options(filtered_files));
    for line in Totals::from_reports(&reports).summary_lines() {
        info!("{line}");
    }

    Ok(Rendered {
        document,
        below_threshold: stats::any_below_threshold(&reports, args.minimum_coverage),
    })
}

/// Run as a GitHub Actions step: inputs from `INPUT_*`, context from the
/// `GITHUB_*` environment.
pub fn cmd_action() -> Result<(Settings, Outcome)> {
    let settings = Settings::load(&EnvSource).context("Invalid action inputs")?;
    let context = Context::from_env()?;
    let payload = match context.event_path.as_deref() {
        Some(path) => EventPayload::from_file(Path::new(path))?,
        None => EventPayload::default(),
    };
    let client = GitHubClient::new(settings.repo_token.clone(), &context);

    let mut outputs: Box<dyn OutputSink> = match GithubOutputFile::from_env() {
        Some(file) => Box::new(file),
        None => Box::new(MemoryOutputs::default()),
    };
    let outcome = action::run(&settings, &context, &payload, &client, outputs.as_mut())?;
    Ok((settings, outcome))
}
