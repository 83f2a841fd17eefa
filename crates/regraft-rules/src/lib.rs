//! regraft-rules: Rule sets for the regraft engine
//!
//! Built-in sets:
//! - search-provider: move drafts handlers onto the search and workspace providers
//! - search-provider-fixups: repair the signature changes that move leaves behind
//! - drafts-migration: both of the above, in order
//!
//! Rules can also be declared in YAML files, see [`yaml_rules`].

pub mod drafts;
pub mod registry;
pub mod yaml_rules;

pub use registry::{RuleSet, RuleSetError, RuleSetRegistry};
pub use yaml_rules::{
    load_rules_from_dir, load_rules_from_file, load_rules_from_string, LoadError, TestResult,
    YamlRule, YamlRuleInterpreter,
};
