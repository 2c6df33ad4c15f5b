//! The full CI run: resolve the change, load coverage, render, publish.

use std::collections::HashSet;

use anyhow::{Context as _, Result};
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::event::{self, EventPayload};
use crate::github::{self, Conclusion, Context, HostApi};
use crate::model::CoverageReport;
use crate::outputs::OutputSink;
use crate::report::{self, RenderOptions};
use crate::source::{self, SourceOptions};
use crate::stats::{self, Totals};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No commit could be determined; nothing was rendered or posted.
    NoCommit,
    Completed {
        comment: String,
        below_threshold: bool,
    },
}

impl Settings {
    /// Rendering options for this run.
    pub fn render_options(
        &self,
        filtered_files: Option<HashSet<String>>,
        repository_url: Option<String>,
    ) -> RenderOptions {
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
            file_url_base: repository_url,
        }
    }

    pub fn source_options(&self) -> SourceOptions {
        SourceOptions {
            skip_covered: self.skip_covered,
            prefix_path: self.prefix_path.clone(),
        }
    }
}

/// Log the grand totals and publish them as outputs.
pub fn publish_totals(reports: &[CoverageReport], outputs: &mut dyn OutputSink) -> Result<Totals> {
    let totals = Totals::from_reports(reports);
    for line in totals.summary_lines() {
        info!("{line}");
    }
    for (name, value) in totals.outputs() {
        outputs.set_output(name, &value.to_string())?;
    }
    Ok(totals)
}

/// Run the action end to end against the given collaborators.
pub fn run(
    settings: &Settings,
    context: &Context,
    payload: &EventPayload,
    api: &dyn HostApi,
    outputs: &mut dyn OutputSink,
) -> Result<Outcome> {
    let change = event::resolve(
        api,
        payload,
        settings.pull_request_number,
        context.sha.as_deref(),
    )
    .context("Failed to resolve pull request")?;
    let Some(commit) = change.commit else {
        error!("Found no commit.");
        return Ok(Outcome::NoCommit);
    };
    let pr_number = change.pull_request_number;

    let changed_files = match (settings.only_changed_files, pr_number) {
        (true, Some(number)) => {
            let files = api
                .list_changed_files(number)
                .context("Failed to list changed files")?;
            info!(count = files.len(), "Restricting report to changed files");
            Some(files.into_iter().collect::<HashSet<_>>())
        }
        (true, None) => {
            warn!("only_changed_files is set but no pull request was found; reporting all files");
            None
        }
        (false, _) => None,
    };

    let reports = source::load_reports(&settings.path, &settings.source_options())
        .with_context(|| format!("Failed to load coverage from '{}'", settings.path))?;

    let options = settings.render_options(changed_files, Some(context.repository_url()));
    let comment = report::render(&reports, &commit, &options);

    publish_totals(&reports, outputs)?;
    let below_threshold = stats::any_below_threshold(&reports, settings.minimum_coverage);

    outputs.set_output("comment", &comment)?;

    let report_name = settings.report_name.as_deref();
    if let (Some(number), true) = (pr_number, settings.add_pr_comment) {
        github::upsert_comment(api, number, &comment, report_name)
            .context("Failed to post PR comment")?;
    }
    if settings.add_check {
        let conclusion = Conclusion::for_threshold(settings.fail_below_threshold, below_threshold);
        let check = github::post_check(api, &comment, report_name, &commit, conclusion)
            .context("Failed to create check run")?;
        if let Some(url) = check.html_url {
            outputs.set_output("url_html", &url)?;
        }
    }

    Ok(Outcome::Completed {
        comment,
        below_threshold,
    })
}
