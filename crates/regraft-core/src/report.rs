//! Change reporting for engine runs
//!
//! A [`ChangeReport`] is assembled while the engine runs and handed to the
//! caller once the last rule has been applied. It has no mutating methods.

use serde::Serialize;

/// How a single rule application ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every match was rewritten
    Applied,
    /// Matches were rewritten, but left for a human to finish
    NeedsReview,
    /// Nothing matched; the buffer was left unchanged
    Unmatched,
}

/// Result of applying one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleApplication {
    pub rule_id: String,
    pub description: String,
    pub match_count: usize,
    pub outcome: Outcome,
    #[serde(skip)]
    pub buffer_before: String,
    #[serde(skip)]
    pub buffer_after: String,
}

impl RuleApplication {
    /// Whether the rule changed the buffer
    pub fn changed(&self) -> bool {
        self.buffer_before != self.buffer_after
    }
}

/// A non-fatal zero-match on an optional rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleWarning {
    pub rule_id: String,
    pub message: String,
}

/// A partial rewrite that needs hand editing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualReviewNotice {
    pub rule_id: String,
    pub note: String,
    /// 1-based lines, in the buffer the rule ran against, where each rewrite began
    pub lines: Vec<usize>,
}

/// Summary counts for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub rules_run: usize,
    pub rules_applied: usize,
    pub rules_unmatched: usize,
    pub total_matches: usize,
    pub manual_review: usize,
}

/// Everything that happened during one engine run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeReport {
    applications: Vec<RuleApplication>,
    warnings: Vec<RuleWarning>,
    notices: Vec<ManualReviewNotice>,
}

impl ChangeReport {
    /// Per-rule results, in the order the rules ran
    pub fn applications(&self) -> &[RuleApplication] {
        &self.applications
    }

    pub fn warnings(&self) -> &[RuleWarning] {
        &self.warnings
    }

    pub fn notices(&self) -> &[ManualReviewNotice] {
        &self.notices
    }

    /// Result for the rule with the given id
    pub fn application(&self, rule_id: &str) -> Option<&RuleApplication> {
        self.applications.iter().find(|a| a.rule_id == rule_id)
    }

    /// Total number of replacements made across all rules
    pub fn total_matches(&self) -> usize {
        self.applications.iter().map(|a| a.match_count).sum()
    }

    /// Whether any rule changed the buffer
    pub fn has_changes(&self) -> bool {
        self.applications.iter().any(RuleApplication::changed)
    }

    pub fn summary(&self) -> Summary {
        let unmatched = self
            .applications
            .iter()
            .filter(|a| a.outcome == Outcome::Unmatched)
            .count();

        Summary {
            rules_run: self.applications.len(),
            rules_applied: self.applications.len() - unmatched,
            rules_unmatched: unmatched,
            total_matches: self.total_matches(),
            manual_review: self.notices.iter().map(|n| n.lines.len()).sum(),
        }
    }
}

/// Accumulates results during a run
#[derive(Debug, Default)]
pub(crate) struct ReportBuilder {
    report: ChangeReport,
}

impl ReportBuilder {
    pub(crate) fn record(&mut self, application: RuleApplication) {
        self.report.applications.push(application);
    }

    pub(crate) fn warn(&mut self, warning: RuleWarning) {
        self.report.warnings.push(warning);
    }

    pub(crate) fn notice(&mut self, notice: ManualReviewNotice) {
        self.report.notices.push(notice);
    }

    pub(crate) fn finish(self) -> ChangeReport {
        self.report
    }
}
