//! Grand totals and threshold checks across coverage reports.

use crate::model::{floor_percent, CoverageReport};

/// Line and branch counters summed over every report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub lines_total: u64,
    pub lines_covered: u64,
    pub branches_total: u64,
    pub branches_covered: u64,
}

impl Totals {
    /// Sum the raw counters. Percentages are never averaged.
    #[must_use]
    pub fn from_reports(reports: &[CoverageReport]) -> Self {
        reports.iter().fold(Self::default(), |acc, r| Self {
            lines_total: acc.lines_total + r.valid_lines,
            lines_covered: acc.lines_covered + r.covered_lines,
            branches_total: acc.branches_total + r.valid_branches,
            branches_covered: acc.branches_covered + r.covered_branches,
        })
    }

    /// Human-readable "covered/total" lines for the run log.
    #[must_use]
    pub fn summary_lines(&self) -> [String; 2] {
        [
            format!("Lines: {}/{}", self.lines_covered, self.lines_total),
            format!("Branches: {}/{}", self.branches_covered, self.branches_total),
        ]
    }

    /// Named values published as step outputs.
    #[must_use]
    pub fn outputs(&self) -> [(&'static str, u64); 4] {
        [
            ("lines_total", self.lines_total),
            ("lines_covered", self.lines_covered),
            ("branches_total", self.branches_total),
            ("branches_covered", self.branches_covered),
        ]
    }
}

/// Whether a floored percentage meets the threshold.
#[must_use]
pub fn passes(percent: f64, minimum: u32) -> bool {
    floor_percent(percent) >= i64::from(minimum)
}

#[must_use]
pub fn is_below_threshold(report: &CoverageReport, minimum: u32) -> bool {
    !passes(report.total_percent, minimum)
}

/// True when at least one report misses the threshold.
#[must_use]
pub fn any_below_threshold(reports: &[CoverageReport], minimum: u32) -> bool {
    reports.iter().any(|r| is_below_threshold(r, minimum))
}
