//! Configuration file support for regraft
//!
//! Loads `.regraft.toml` from current directory or parent directories.

use anyhow::{bail, Context, Result};
use regraft_core::Rule;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Name of the config file searched for
pub const CONFIG_FILE: &str = ".regraft.toml";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rules: RulesConfig,
    pub output: OutputConfig,
    /// Directory the config was loaded from; relative rule files resolve against it
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Built-in rule set to run
    pub set: Option<String>,
    /// YAML rule files, directories or glob patterns, run after the set
    pub files: Vec<String>,
    /// Rule ids to drop from the final list
    pub disabled: Vec<String>,
    /// Rule ids whose zero matches abort the run
    pub required: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text", "json" or "diff"
    pub format: Option<String>,
}

impl Config {
    /// Load config from `.regraft.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Rule file entries, with relative paths resolved against the config's directory
    pub fn rule_files(&self) -> Vec<String> {
        self.rules
            .files
            .iter()
            .map(|entry| match &self.base_dir {
                Some(base) if Path::new(entry).is_relative() => {
                    base.join(entry).to_string_lossy().into_owned()
                }
                _ => entry.clone(),
            })
            .collect()
    }

    /// Drop disabled rules and promote required ones
    ///
    /// Unknown disabled ids only warn; an unknown required id is an error, since
    /// the promise it makes cannot be kept.
    pub fn apply(&self, rules: Vec<Rule>) -> Result<Vec<Rule>> {
        for id in &self.rules.disabled {
            if !rules.iter().any(|r| r.id() == id) {
                warn!(rule = %id, "disabled rule is not loaded");
            }
        }
        for id in &self.rules.required {
            if !rules.iter().any(|r| r.id() == id) {
                bail!("Required rule '{}' is not loaded", id);
            }
            if self.rules.disabled.contains(id) {
                bail!("Rule '{}' is both required and disabled", id);
            }
        }

        Ok(rules
            .into_iter()
            .filter(|r| !self.rules.disabled.iter().any(|id| id == r.id()))
            .map(|mut r| {
                if self.rules.required.iter().any(|id| id == r.id()) {
                    r.set_required(true);
                }
                r
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_config(dir: &Path, content: &str) {
        fs::write(dir.join(CONFIG_FILE), content).unwrap();
    }

    fn rule(id: &str) -> Rule {
        Rule::builder(id).pattern(id).template("x").build().unwrap()
    }

    #[test]
    fn test_load_basic_config() {
        let temp = TempDir::new().unwrap();
        create_config(
            temp.path(),
            r#"
[rules]
set = "search-provider"
files = ["rules/extra.yaml"]
disabled = ["workspace-adapter"]
required = ["draft-get-object"]

[output]
format = "json"
"#,
        );

        let (config, path) = Config::load_from(temp.path().to_path_buf())
            .unwrap()
            .unwrap();

        assert_eq!(path, temp.path().join(CONFIG_FILE));
        assert_eq!(config.rules.set.as_deref(), Some("search-provider"));
        assert_eq!(config.rules.disabled, vec!["workspace-adapter".to_string()]);
        assert_eq!(config.rules.required, vec!["draft-get-object".to_string()]);
        assert_eq!(config.output.format, Some("json".to_string()));
        assert_eq!(
            config.rule_files(),
            vec![temp.path().join("rules/extra.yaml").to_string_lossy().into_owned()]
        );
    }

    #[test]
    fn test_load_from_parent_dir() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "[rules]\nset = \"drafts-migration\"\n");
        let nested = temp.path().join("internal/api");
        fs::create_dir_all(&nested).unwrap();

        let (config, path) = Config::load_from(nested).unwrap().unwrap();

        assert_eq!(path, temp.path().join(CONFIG_FILE));
        assert_eq!(config.rules.set.as_deref(), Some("drafts-migration"));
    }

    #[test]
    fn test_load_empty_config() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "");

        let (config, _) = Config::load_from(temp.path().to_path_buf())
            .unwrap()
            .unwrap();

        assert!(config.rules.set.is_none());
        assert!(config.rules.files.is_empty());
        assert!(config.rules.disabled.is_empty());
        assert!(config.output.format.is_none());
    }

    #[test]
    fn test_invalid_config() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "[rules]\nset = 3\n");

        assert!(Config::load_from(temp.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_no_config_found() {
        let temp = TempDir::new().unwrap();
        let result = Config::load_from(temp.path().to_path_buf()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_absolute_rule_file_kept() {
        let config = Config {
            rules: RulesConfig {
                files: vec!["/etc/regraft/rules.yaml".to_string()],
                ..Default::default()
            },
            base_dir: Some(PathBuf::from("/home/dev/project")),
            ..Default::default()
        };

        assert_eq!(config.rule_files(), vec!["/etc/regraft/rules.yaml".to_string()]);
    }

    #[test]
    fn test_apply_disabled_and_required() {
        let config = Config {
            rules: RulesConfig {
                disabled: vec!["b".to_string(), "missing".to_string()],
                required: vec!["c".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };

        let rules = config.apply(vec![rule("a"), rule("b"), rule("c")]).unwrap();

        let ids: Vec<&str> = rules.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(!rules[0].is_required());
        assert!(rules[1].is_required());
    }

    #[test]
    fn test_apply_unknown_required() {
        let config = Config {
            rules: RulesConfig {
                required: vec!["nope".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(config.apply(vec![rule("a")]).is_err());
    }
}
