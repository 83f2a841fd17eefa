//! YAML rule schema definitions
//!
//! Defines the structure of YAML-based rewrite rules using serde
//! for deserialization from YAML format.

use regraft_core::{Rule, RewriteError};
use serde::{Deserialize, Serialize};

/// A complete YAML-defined rewrite rule
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct YamlRule {
    /// Unique rule identifier (e.g., "workspace-get-file")
    pub id: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Regex to match
    #[serde(default)]
    pub pattern: Option<String>,

    /// Balanced call to match, instead of `pattern`
    #[serde(default)]
    pub call: Option<CallPattern>,

    /// Let `.` match newlines
    #[serde(default)]
    pub dot_all: bool,

    /// Skip matches followed by this regex
    #[serde(default)]
    pub not_followed_by: Option<String>,

    /// Replacement template
    pub replace: String,

    /// Abort the run when nothing matches
    #[serde(default)]
    pub required: bool,

    /// Manual-review note attached to every rewrite
    #[serde(default)]
    pub review: Option<String>,

    /// Inline test cases
    #[serde(default)]
    pub tests: Vec<TestCase>,
}

/// Head and optional tail of a balanced call pattern
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CallPattern {
    /// Regex ending in `\(`
    pub head: String,

    /// Regex that must match right after the closing parenthesis
    #[serde(default)]
    pub tail: Option<String>,
}

/// A test case for a YAML rule
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    /// Input text
    pub input: String,

    /// Expected output (if the rule should match)
    #[serde(default)]
    pub output: Option<String>,

    /// Skip this test case
    #[serde(default)]
    pub skip: bool,
}

impl YamlRule {
    /// Validate that the rule is well-formed
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Rule id is required".to_string());
        }
        match (&self.pattern, &self.call) {
            (Some(_), Some(_)) => Err(format!("{}: give either pattern or call, not both", self.id)),
            (None, None) => Err(format!("{}: pattern or call is required", self.id)),
            _ => Ok(()),
        }
    }

    /// Compile into an engine rule
    pub fn compile(&self) -> Result<Rule, RewriteError> {
        let mut builder = Rule::builder(&self.id)
            .description(&self.description)
            .template(&self.replace);

        builder = match (&self.pattern, &self.call) {
            (_, Some(CallPattern { head, tail: Some(tail) })) => builder.call_then(head, tail),
            (_, Some(CallPattern { head, tail: None })) => builder.call(head),
            (Some(pattern), None) => builder.pattern(pattern),
            (None, None) => builder,
        };
        if self.dot_all {
            builder = builder.dot_matches_newline();
        }
        if let Some(guard) = &self.not_followed_by {
            builder = builder.not_followed_by(guard);
        }
        if self.required {
            builder = builder.required();
        }
        if let Some(note) = &self.review {
            builder = builder.manual_review(note);
        }

        builder.build()
    }
}
