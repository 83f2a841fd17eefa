//! Rewrite rules and their builder

use std::fmt;
use std::sync::Arc;

use crate::error::RewriteError;
use crate::pattern::{Match, Pattern, PatternError};
use crate::template::Template;

/// Function computing the full replacement text for one match
pub type ReplaceFn = Arc<dyn Fn(&Match) -> String + Send + Sync>;

/// How a rule produces replacement text
#[derive(Clone)]
pub enum Replacement {
    /// Template with group references
    Template(Template),
    /// Function called once per match; its output is used verbatim
    Function(ReplaceFn),
}

impl Replacement {
    /// Produce the replacement text for a match
    pub fn expand(&self, m: &Match) -> String {
        match self {
            Replacement::Template(template) => template.expand(m),
            Replacement::Function(f) => f(m),
        }
    }
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacement::Template(t) => f.debug_tuple("Template").field(&t.as_str()).finish(),
            Replacement::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// What the engine does when a rule finds nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroMatchPolicy {
    /// Record a warning and move on
    #[default]
    Warn,
    /// Abort the run
    Error,
}

/// A compiled rewrite rule
///
/// Rules are immutable once built; applying one twice to the same buffer gives
/// the same result.
#[derive(Debug, Clone)]
pub struct Rule {
    id: String,
    description: String,
    pattern: Pattern,
    replacement: Replacement,
    on_zero_matches: ZeroMatchPolicy,
    review_note: Option<String>,
}

impl Rule {
    /// Start building a rule with the given id
    pub fn builder(id: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn replacement(&self) -> &Replacement {
        &self.replacement
    }

    pub fn on_zero_matches(&self) -> ZeroMatchPolicy {
        self.on_zero_matches
    }

    /// Whether zero matches aborts the run
    pub fn is_required(&self) -> bool {
        self.on_zero_matches == ZeroMatchPolicy::Error
    }

    /// Note attached to every spot this rule rewrites only partially
    pub fn review_note(&self) -> Option<&str> {
        self.review_note.as_deref()
    }

    /// Promote or demote the rule's zero-match policy
    pub fn set_required(&mut self, required: bool) {
        self.on_zero_matches = if required {
            ZeroMatchPolicy::Error
        } else {
            ZeroMatchPolicy::Warn
        };
    }

    /// Find every match of this rule's pattern
    pub fn find(&self, buffer: &str) -> Vec<Match> {
        self.pattern.find_all(buffer)
    }
}

#[derive(Debug, Clone)]
enum PatternSource {
    Regex(String),
    Call { head: String, tail: Option<String> },
}

/// Builder for [`Rule`]
///
/// Nothing is compiled until [`RuleBuilder::build`], which reports every problem
/// as a [`RewriteError`] carrying the rule id.
///
/// ```
/// use regraft_core::Rule;
///
/// let rule = Rule::builder("workspace-get-file")
///     .description("Call GetFile on the workspace provider")
///     .pattern(r"\bs\.GetFile\(")
///     .template("workspaceProvider.GetFile(")
///     .build()
///     .unwrap();
/// assert_eq!(rule.id(), "workspace-get-file");
/// ```
pub struct RuleBuilder {
    id: String,
    description: String,
    pattern: Option<PatternSource>,
    dot_all: bool,
    guard: Option<String>,
    template: Option<String>,
    function: Option<ReplaceFn>,
    on_zero_matches: ZeroMatchPolicy,
    review_note: Option<String>,
}

impl RuleBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            pattern: None,
            dot_all: false,
            guard: None,
            template: None,
            function: None,
            on_zero_matches: ZeroMatchPolicy::Warn,
            review_note: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Match with a regex
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(PatternSource::Regex(pattern.into()));
        self
    }

    /// Match a call by its head, capturing the balanced argument list
    pub fn call(mut self, head: impl Into<String>) -> Self {
        self.pattern = Some(PatternSource::Call {
            head: head.into(),
            tail: None,
        });
        self
    }

    /// Match a call followed directly by `tail`
    pub fn call_then(mut self, head: impl Into<String>, tail: impl Into<String>) -> Self {
        self.pattern = Some(PatternSource::Call {
            head: head.into(),
            tail: Some(tail.into()),
        });
        self
    }

    /// Let `.` match newlines
    pub fn dot_matches_newline(mut self) -> Self {
        self.dot_all = true;
        self
    }

    /// Skip matches whose following text starts with `guard`
    pub fn not_followed_by(mut self, guard: impl Into<String>) -> Self {
        self.guard = Some(guard.into());
        self
    }

    /// Replace each match with a template
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self.function = None;
        self
    }

    /// Replace each match with the output of `f`
    pub fn with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Match) -> String + Send + Sync + 'static,
    {
        self.function = Some(Arc::new(f));
        self.template = None;
        self
    }

    /// Abort the run when the rule matches nothing
    pub fn required(mut self) -> Self {
        self.on_zero_matches = ZeroMatchPolicy::Error;
        self
    }

    /// Mark every rewrite by this rule as needing manual follow-up
    pub fn manual_review(mut self, note: impl Into<String>) -> Self {
        self.review_note = Some(note.into());
        self
    }

    /// Compile the pattern and validate the replacement
    pub fn build(self) -> Result<Rule, RewriteError> {
        let id = self.id;
        if id.trim().is_empty() {
            return Err(RewriteError::InvalidRule {
                rule: id,
                message: "rule id must not be empty".to_string(),
            });
        }

        let source = self.pattern.ok_or_else(|| RewriteError::InvalidRule {
            rule: id.clone(),
            message: "no pattern given".to_string(),
        })?;

        let pattern = match &source {
            PatternSource::Regex(re) => Pattern::regex(re, self.dot_all),
            PatternSource::Call { head, tail } => {
                Pattern::balanced_call(head, tail.as_deref(), self.dot_all)
            }
        };
        let pattern = match self.guard {
            Some(guard) => pattern.and_then(|p| p.not_followed_by(&guard)),
            None => pattern,
        }
        .map_err(|e| pattern_error(&id, e))?;

        let replacement = match (self.template, self.function) {
            (_, Some(f)) => Replacement::Function(f),
            (Some(text), None) => {
                let template = Template::parse(&text).map_err(|message| {
                    RewriteError::InvalidTemplate {
                        rule: id.clone(),
                        message,
                    }
                })?;
                template
                    .check(&pattern)
                    .map_err(|missing| RewriteError::UnknownGroup {
                        rule: id.clone(),
                        group: missing.0,
                    })?;
                Replacement::Template(template)
            }
            (None, None) => {
                return Err(RewriteError::InvalidRule {
                    rule: id,
                    message: "no replacement given".to_string(),
                })
            }
        };

        Ok(Rule {
            id,
            description: self.description,
            pattern,
            replacement,
            on_zero_matches: self.on_zero_matches,
            review_note: self.review_note,
        })
    }
}

fn pattern_error(id: &str, error: PatternError) -> RewriteError {
    match error {
        PatternError::Regex(source) => RewriteError::InvalidPattern {
            rule: id.to_string(),
            source,
        },
        other => RewriteError::InvalidRule {
            rule: id.to_string(),
            message: other.to_string(),
        },
    }
}
