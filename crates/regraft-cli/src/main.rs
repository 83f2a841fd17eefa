//! regraft CLI - rule-based source rewriting for API migrations
//!
//! Runs an ordered list of rewrite rules over one file. Rules come from a
//! built-in set, YAML rule files, or both:
//! - search-provider: move drafts handlers onto the search and workspace providers
//! - search-provider-fixups: repair signatures left behind by search-provider
//! - drafts-migration: both, in order (the default)

mod config;
mod output;
mod process;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::Config;
use output::{OutputFormat, Reporter};
use process::{process_file, write_file};
use regraft_core::{Rule, RuleEngine};
use regraft_rules::{load_rules_from_dir, load_rules_from_file, RuleSetRegistry, YamlRuleInterpreter};

/// Set run when neither a set nor rule files are given
const DEFAULT_SET: &str = "drafts-migration";

#[derive(Parser)]
#[command(name = "regraft")]
#[command(version)]
#[command(about = "Rule-based source rewriting for API migrations")]
struct Cli {
    /// File to rewrite
    #[arg(required_unless_present_any = ["list_sets", "verify"])]
    path: Option<PathBuf>,

    /// Built-in rule set to run. Overrides config file.
    #[arg(long, short = 's', value_name = "SET")]
    set: Option<String>,

    /// YAML rule files, directories or glob patterns, run after the set.
    /// Overrides config file.
    #[arg(long, short = 'r', value_name = "FILE")]
    rules: Vec<String>,

    /// Show changes without writing the file
    #[arg(long, short = 'n')]
    check: bool,

    /// Output format: text, json, diff
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Path to config file (default: auto-detect .regraft.toml)
    #[arg(long, value_name = "PATH", conflicts_with = "no_config")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,

    /// List built-in rule sets and exit
    #[arg(long)]
    list_sets: bool,

    /// Run the inline tests of YAML rules and exit
    #[arg(long)]
    verify: bool,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "regraft=debug" } else { "regraft=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let registry = RuleSetRegistry::new();

    // Handle --list-sets
    if cli.list_sets {
        println!("{}", "Available rule sets:".bold());
        for set in registry.list() {
            println!("  {} - {}", set.name.green(), set.description);
            if cli.verbose {
                for rule in set.rules()? {
                    println!("      {} {}", rule.id(), rule.description().dimmed());
                }
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Load config file
    let config = if cli.no_config {
        Config::default()
    } else if let Some(config_path) = &cli.config {
        Config::load_path(config_path)?
    } else {
        match Config::load()? {
            Some((cfg, path)) => {
                debug!(path = %path.display(), "using config");
                cfg
            }
            None => Config::default(),
        }
    };

    // Determine output format
    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        let format = cli
            .format
            .as_deref()
            .or(config.output.format.as_deref())
            .unwrap_or("text");
        OutputFormat::from_str(format).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid output format '{}'. Valid options: text, json, diff",
                format
            )
        })?
    };
    let reporter = Reporter::new(output_format, cli.verbose);

    let rule_files = if cli.rules.is_empty() {
        config.rule_files()
    } else {
        cli.rules.clone()
    };
    let yaml_rules = load_yaml_rules(&rule_files)?;

    // Handle --verify
    if cli.verify {
        if yaml_rules.is_empty() {
            bail!("No YAML rules to verify; pass them with --rules");
        }
        let results: Vec<_> = yaml_rules.iter().flat_map(|r| r.run_tests()).collect();
        let passed = reporter.report_tests(&results)?;
        return Ok(if passed {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        });
    }

    let set_name = cli.set.clone().or_else(|| config.rules.set.clone()).or_else(|| {
        yaml_rules.is_empty().then(|| DEFAULT_SET.to_string())
    });

    let mut rules: Vec<Rule> = match &set_name {
        Some(name) => registry.rules(name)?,
        None => Vec::new(),
    };
    rules.extend(yaml_rules.into_iter().map(YamlRuleInterpreter::into_rule));
    let rules = config.apply(rules)?;

    if rules.is_empty() {
        bail!("No rules enabled");
    }

    let Some(path) = cli.path.as_deref() else {
        bail!("No file given");
    };
    if !path.is_file() {
        bail!("Not a file: {}", path.display());
    }

    if cli.verbose && output_format == OutputFormat::Text {
        println!(
            "{}: {}",
            "Mode".bold(),
            if cli.check { "check" } else { "write" }
        );
        if let Some(name) = &set_name {
            println!("{}: {}", "Rule set".bold(), name);
        }
        println!("{}: {}", "Rules".bold(), rules.len());
        println!();
    }

    let engine = RuleEngine::new(rules);
    let result = process_file(path, &engine)?;

    if !cli.check && result.has_changes() {
        write_file(path, &result.new_source)?;
    }

    reporter.report(path, &result, cli.check)?;

    // Determine exit code
    Ok(if cli.check && result.has_changes() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}

/// Load YAML rules from files, directories or glob patterns, in the order given
fn load_yaml_rules(entries: &[String]) -> Result<Vec<YamlRuleInterpreter>> {
    let mut rules = Vec::new();

    for entry in entries {
        for path in expand_entry(entry)? {
            let loaded = if path.is_dir() {
                load_rules_from_dir(&path)
            } else {
                load_rules_from_file(&path)
            }
            .with_context(|| format!("Failed to load rules from {}", path.display()))?;
            rules.extend(loaded);
        }
    }

    Ok(rules)
}

fn expand_entry(entry: &str) -> Result<Vec<PathBuf>> {
    if !entry.contains(['*', '?', '[']) {
        return Ok(vec![PathBuf::from(entry)]);
    }

    let mut paths = glob::glob(entry)
        .with_context(|| format!("Invalid rule file pattern: {}", entry))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to expand {}", entry))?;
    paths.sort();

    if paths.is_empty() {
        bail!("No rule files match {}", entry);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_rule(dir: &Path, name: &str, id: &str) {
        fs::write(
            dir.join(name),
            format!("id: {id}\npattern: '{id}'\nreplace: 'done'\n"),
        )
        .unwrap();
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_path_required_unless_listing() {
        assert!(Cli::try_parse_from(["regraft"]).is_err());
        assert!(Cli::try_parse_from(["regraft", "--list-sets"]).is_ok());
        assert!(Cli::try_parse_from(["regraft", "--verify", "-r", "rules.yaml"]).is_ok());

        let cli = Cli::try_parse_from(["regraft", "--check", "drafts.go", "-r", "a.yaml", "-r", "b.yaml"]).unwrap();
        assert!(cli.check);
        assert_eq!(cli.path, Some(PathBuf::from("drafts.go")));
        assert_eq!(cli.rules, vec!["a.yaml".to_string(), "b.yaml".to_string()]);
    }

    #[test]
    fn test_json_conflicts_with_format() {
        assert!(Cli::try_parse_from(["regraft", "--json", "--format", "text", "drafts.go"]).is_err());
    }

    #[test]
    fn test_load_yaml_rules_in_order() {
        let temp = TempDir::new().unwrap();
        write_rule(temp.path(), "b.yaml", "beta");
        write_rule(temp.path(), "a.yaml", "alpha");
        let plain = temp.path().join("b.yaml").to_string_lossy().into_owned();
        let pattern = temp.path().join("*.yaml").to_string_lossy().into_owned();

        let rules = load_yaml_rules(&[plain, pattern]).unwrap();
        let ids: Vec<&str> = rules.iter().map(|r| r.rule().id()).collect();

        assert_eq!(ids, vec!["beta", "alpha", "beta"]);
    }

    #[test]
    fn test_glob_without_matches() {
        let temp = TempDir::new().unwrap();
        let pattern = temp.path().join("*.yaml").to_string_lossy().into_owned();

        assert!(load_yaml_rules(&[pattern]).is_err());
    }
}
