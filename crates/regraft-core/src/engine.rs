//! Sequential rule engine
//!
//! Rules run strictly in the order given. Each rule sees the buffer produced by
//! the rule before it, and produces a new owned buffer for the rule after it.
//! A rule rewrites all of its matches in one left-to-right pass; text it inserts
//! is never re-scanned by the same rule.

use tracing::{debug, info};

use crate::edit::{apply_edits, offset_to_line, Edit};
use crate::error::RewriteError;
use crate::report::{
    ChangeReport, ManualReviewNotice, Outcome, ReportBuilder, RuleApplication, RuleWarning,
};
use crate::rule::{Rule, ZeroMatchPolicy};

/// Applies an ordered list of rules to a buffer
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Run every rule over `input`
    ///
    /// Returns the final buffer and the report. A required rule that matches
    /// nothing aborts the run; no partial buffer is returned in that case.
    pub fn run(&self, input: &str) -> Result<(String, ChangeReport), RewriteError> {
        let mut report = ReportBuilder::default();
        let mut buffer = input.to_string();

        for rule in &self.rules {
            buffer = apply_rule(rule, buffer, &mut report)?;
        }

        Ok((buffer, report.finish()))
    }
}

fn apply_rule(rule: &Rule, before: String, report: &mut ReportBuilder) -> Result<String, RewriteError> {
    let matches = rule.find(&before);
    debug!(rule = rule.id(), matches = matches.len(), "applying rule");

    if matches.is_empty() {
        if rule.on_zero_matches() == ZeroMatchPolicy::Error {
            return Err(RewriteError::RequiredRuleUnmatched {
                rule: rule.id().to_string(),
                description: rule.description().to_string(),
            });
        }

        debug!(rule = rule.id(), "rule matched nothing");
        report.warn(RuleWarning {
            rule_id: rule.id().to_string(),
            message: format!("no matches for `{}`", rule.pattern().as_str()),
        });
        report.record(RuleApplication {
            rule_id: rule.id().to_string(),
            description: rule.description().to_string(),
            match_count: 0,
            outcome: Outcome::Unmatched,
            buffer_before: before.clone(),
            buffer_after: before.clone(),
        });
        return Ok(before);
    }

    let edits: Vec<Edit> = matches
        .iter()
        .map(|m| Edit::new(m.start..m.end, rule.replacement().expand(m)).with_rule(rule.id()))
        .collect();

    let after = apply_edits(&before, &edits).map_err(|source| RewriteError::Edit {
        rule: rule.id().to_string(),
        source,
    })?;

    let outcome = match rule.review_note() {
        Some(note) => {
            let lines: Vec<usize> = matches.iter().map(|m| offset_to_line(&before, m.start)).collect();
            info!(rule = rule.id(), spots = lines.len(), "rewrite needs manual review");
            report.notice(ManualReviewNotice {
                rule_id: rule.id().to_string(),
                note: note.to_string(),
                lines,
            });
            Outcome::NeedsReview
        }
        None => Outcome::Applied,
    };

    report.record(RuleApplication {
        rule_id: rule.id().to_string(),
        description: rule.description().to_string(),
        match_count: matches.len(),
        outcome,
        buffer_before: before,
        buffer_after: after.clone(),
    });

    Ok(after)
}
