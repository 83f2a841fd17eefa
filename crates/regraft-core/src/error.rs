//! Error taxonomy for rule construction and engine runs

use thiserror::Error;

use crate::edit::EditError;

/// Errors raised while building rules or running the engine
///
/// Every variant is fatal for the run. Non-fatal outcomes (zero matches on an
/// optional rule, partial rewrites) are recorded in the
/// [`ChangeReport`](crate::ChangeReport) instead.
#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("rule `{rule}`: pattern failed to compile: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule `{rule}`: invalid template: {message}")]
    InvalidTemplate { rule: String, message: String },

    #[error("rule `{rule}`: template references unknown capture group `{group}`")]
    UnknownGroup { rule: String, group: String },

    #[error("rule `{rule}`: {message}")]
    InvalidRule { rule: String, message: String },

    #[error("required rule `{rule}` matched nothing ({description})")]
    RequiredRuleUnmatched { rule: String, description: String },

    #[error("rule `{rule}`: {source}")]
    Edit {
        rule: String,
        #[source]
        source: EditError,
    },
}

impl RewriteError {
    /// Id of the rule the error is attributed to
    pub fn rule_id(&self) -> &str {
        match self {
            RewriteError::InvalidPattern { rule, .. }
            | RewriteError::InvalidTemplate { rule, .. }
            | RewriteError::UnknownGroup { rule, .. }
            | RewriteError::InvalidRule { rule, .. }
            | RewriteError::RequiredRuleUnmatched { rule, .. }
            | RewriteError::Edit { rule, .. } => rule,
        }
    }

    /// Whether the error comes from a malformed rule rather than from the input
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, RewriteError::RequiredRuleUnmatched { .. })
    }
}
