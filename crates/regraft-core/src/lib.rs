//! regraft-core: sequential text-rewriting engine
//!
//! This crate provides:
//! - `Pattern`: regex and balanced-call matching with capture groups
//! - `Template`: verbatim replacement templates with group references
//! - `Rule` / `RuleBuilder`: a pattern plus a template or replacement function
//! - `RuleEngine`: applies rules strictly in order over a buffer
//! - `ChangeReport`: per-rule counts, warnings and manual-review notices
//! - `Edit` / `apply_edits()`: the byte-range replacement primitive
//!
//! # Example
//!
//! ```
//! use regraft_core::{Rule, RuleEngine};
//!
//! let rules = vec![
//!     Rule::builder("drop-errs-import")
//!         .pattern("\t\"pkg/errs\"\n")
//!         .template("")
//!         .build()
//!         .unwrap(),
//! ];
//! let (output, report) = RuleEngine::new(rules)
//!     .run("import (\n\t\"pkg/errs\"\n)\n")
//!     .unwrap();
//! assert_eq!(output, "import (\n)\n");
//! assert_eq!(report.summary().rules_applied, 1);
//! ```

mod edit;
mod engine;
mod error;
pub mod pattern;
mod report;
mod rule;
pub mod template;

pub use edit::{apply_edits, offset_to_line, Edit, EditError};
pub use engine::RuleEngine;
pub use error::RewriteError;
pub use pattern::{Match, Pattern, PatternError, ARGS_GROUP};
pub use report::{
    ChangeReport, ManualReviewNotice, Outcome, RuleApplication, RuleWarning, Summary,
};
pub use rule::{ReplaceFn, Replacement, Rule, RuleBuilder, ZeroMatchPolicy};
pub use template::Template;
