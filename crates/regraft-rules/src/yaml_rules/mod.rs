//! YAML rule files for defining rewrite rules declaratively
//!
//! Rules written in YAML compile to the same [`regraft_core::Rule`] the
//! built-in sets use, and can carry inline test cases.
//!
//! # Example YAML Rule
//!
//! ```yaml
//! id: workspace-get-file
//! description: Call GetFile on the workspace provider
//! pattern: '\bs\.GetFile\('
//! replace: 'workspaceProvider.GetFile('
//!
//! tests:
//!   - input: "f, err := s.GetFile(id)"
//!     output: "f, err := workspaceProvider.GetFile(id)"
//!   - input: "f, err := docs.GetFile(id)"
//! ```
//!
//! A test case without `output` asserts that the rule does not match.

pub mod interpreter;
pub mod loader;
pub mod schema;

pub use interpreter::{TestResult, YamlRuleInterpreter};
pub use loader::{load_rules_from_dir, load_rules_from_file, load_rules_from_string, LoadError};
pub use schema::{CallPattern, TestCase, YamlRule};
