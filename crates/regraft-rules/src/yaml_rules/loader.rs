//! YAML rule loader
//!
//! Load YAML rules from files, directories, or strings. Every rule is validated
//! and compiled while loading, so a bad rule file fails before any text is
//! rewritten.

use std::fs;
use std::path::{Path, PathBuf};

use regraft_core::RewriteError;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use super::interpreter::YamlRuleInterpreter;
use super::schema::YamlRule;

/// Errors that can occur when loading YAML rules
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid rule: {0}")]
    Validation(String),

    #[error(transparent)]
    Rule(#[from] RewriteError),
}

/// Load one rule or a list of rules from a string
pub fn load_rules_from_string(yaml: &str) -> Result<Vec<YamlRuleInterpreter>, LoadError> {
    // A top-level sequence is a list of rules, anything else a single rule
    let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    let specs = if value.is_sequence() {
        serde_yaml::from_value::<Vec<YamlRule>>(value)?
    } else {
        vec![serde_yaml::from_value::<YamlRule>(value)?]
    };

    let mut interpreters = Vec::with_capacity(specs.len());
    for spec in specs {
        spec.validate().map_err(LoadError::Validation)?;
        interpreters.push(YamlRuleInterpreter::new(spec)?);
    }

    Ok(interpreters)
}

/// Load YAML rules from a file
pub fn load_rules_from_file(path: &Path) -> Result<Vec<YamlRuleInterpreter>, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rules = load_rules_from_string(&content)?;
    debug!(path = %path.display(), rules = rules.len(), "loaded rule file");
    Ok(rules)
}

/// Load all YAML rules under a directory
///
/// Files are visited in path order so the resulting rule order is stable.
pub fn load_rules_from_dir(dir: &Path) -> Result<Vec<YamlRuleInterpreter>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::Io {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "directory not found"),
        });
    }

    let mut all_rules = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| LoadError::Io {
            path: e.path().unwrap_or(dir).to_path_buf(),
            source: e.into(),
        })?;
        let path = entry.path();

        if entry.file_type().is_file() && is_yaml(path) {
            all_rules.extend(load_rules_from_file(path)?);
        }
    }

    Ok(all_rules)
}

fn is_yaml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml")
}
