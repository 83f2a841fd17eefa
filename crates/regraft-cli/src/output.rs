//! Output formatting for regraft
//!
//! Supports text (colored terminal), JSON and unified diff output formats.

use anyhow::Result;
use colored::*;
use regraft_core::{ManualReviewNotice, Outcome, RuleApplication, RuleWarning, Summary};
use regraft_rules::TestResult;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::path::Path;

use crate::process::ProcessResult;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Diff,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "diff" => Some(OutputFormat::Diff),
            _ => None,
        }
    }
}

/// Full JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    pub version: String,
    pub path: String,
    pub mode: &'static str,
    pub changed: bool,
    pub summary: Summary,
    pub rules: &'a [RuleApplication],
    pub warnings: &'a [RuleWarning],
    pub notices: &'a [ManualReviewNotice],
}

impl<'a> JsonOutput<'a> {
    pub fn new(path: &Path, result: &'a ProcessResult, check_mode: bool) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            path: path.display().to_string(),
            mode: if check_mode { "check" } else { "write" },
            changed: result.has_changes(),
            summary: result.report.summary(),
            rules: result.report.applications(),
            warnings: result.report.warnings(),
            notices: result.report.notices(),
        }
    }
}

/// Prints the outcome of a run
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Report a processed file
    pub fn report(&self, path: &Path, result: &ProcessResult, check_mode: bool) -> Result<()> {
        match self.format {
            OutputFormat::Text => self.report_text(path, result, check_mode),
            OutputFormat::Json => {
                let output = JsonOutput::new(path, result, check_mode);
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Diff => {
                if result.has_changes() {
                    print_unified_diff(path, &result.old_source, &result.new_source);
                }
            }
        }
        Ok(())
    }

    fn report_text(&self, path: &Path, result: &ProcessResult, check_mode: bool) {
        let report = &result.report;

        println!("{}", path.display().to_string().bold());
        for app in report.applications() {
            match app.outcome {
                Outcome::Applied => {
                    println!("  {} {} ({})", "->".green(), app.rule_id, app.match_count);
                }
                Outcome::NeedsReview => {
                    println!(
                        "  {} {} ({}, needs review)",
                        "!".yellow(),
                        app.rule_id,
                        app.match_count
                    );
                }
                Outcome::Unmatched => {
                    println!("  {} {} (no matches)", "-".dimmed(), app.rule_id.dimmed());
                }
            }
            if self.verbose && !app.description.is_empty() {
                println!("      {}", app.description.dimmed());
            }
        }

        if check_mode && result.has_changes() {
            println!();
            print_diff(&result.old_source, &result.new_source);
        }

        if !report.notices().is_empty() {
            println!();
            println!("{}", "Manual review".yellow().bold());
            for notice in report.notices() {
                let lines: Vec<String> = notice.lines.iter().map(usize::to_string).collect();
                println!(
                    "  {} (line {}): {}",
                    notice.rule_id,
                    lines.join(", "),
                    notice.note
                );
            }
        }

        let summary = report.summary();
        println!();
        println!("{}", "Summary".bold().underline());
        println!("  Rules run: {}", summary.rules_run);
        println!("  Rules applied: {}", summary.rules_applied);
        println!("  Rules without matches: {}", summary.rules_unmatched);
        println!("  Total matches: {}", summary.total_matches);
        if summary.manual_review > 0 {
            println!("  Needs manual review: {}", summary.manual_review);
        }

        println!();
        if !result.has_changes() {
            println!("No changes");
        } else if check_mode {
            println!("{}", "Run without --check to apply changes".yellow());
        } else {
            println!("  {} Wrote {}", "OK".green(), path.display());
        }
    }

    /// Report inline rule test results; returns whether all passed
    pub fn report_tests(&self, results: &[TestResult]) -> Result<bool> {
        let failed = results.iter().filter(|r| !r.passed).count();

        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(results)?);
            return Ok(failed == 0);
        }

        for result in results {
            if result.passed {
                if self.verbose {
                    println!("  {} {}", "PASS".green(), result.rule_id);
                }
                continue;
            }

            println!("  {} {}", "FAIL".red(), result.rule_id.bold());
            println!("    input:    {:?}", result.input);
            if let Some(expected) = &result.expected {
                println!("    expected: {:?}", expected);
            }
            if let Some(actual) = &result.actual {
                println!("    actual:   {:?}", actual);
            }
            if let Some(error) = &result.error {
                println!("    {}", error.red());
            }
        }

        println!();
        println!(
            "{} tests, {} passed, {} failed",
            results.len(),
            results.len() - failed,
            failed
        );
        Ok(failed == 0)
    }
}

/// Print a colored diff between old and new content
fn print_diff(old: &str, new: &str) {
    for change in TextDiff::from_lines(old, new).iter_all_changes() {
        let line = change.value().trim_end_matches('\n');
        match change.tag() {
            ChangeTag::Delete => println!("  {}", format!("- {}", line).red()),
            ChangeTag::Insert => println!("  {}", format!("+ {}", line).green()),
            // Skip unchanged lines for cleaner output
            ChangeTag::Equal => {}
        }
    }
}

/// Print unified diff format (standard diff -u compatible)
fn print_unified_diff(path: &Path, old: &str, new: &str) {
    print!("{}", unified_diff(path, old, new));
}

fn unified_diff(path: &Path, old: &str, new: &str) -> String {
    let path_str = path.display().to_string();
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{}", path_str), &format!("b/{}", path_str))
        .to_string()
}
