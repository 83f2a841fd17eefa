//! Registry of built-in rule sets

use regraft_core::{Rule, RewriteError};
use thiserror::Error;

use crate::drafts;

/// Errors raised when resolving a rule set
#[derive(Error, Debug)]
pub enum RuleSetError {
    #[error("unknown rule set `{name}` (available: {})", available.join(", "))]
    Unknown {
        name: String,
        available: Vec<&'static str>,
    },

    #[error(transparent)]
    Build(#[from] RewriteError),
}

/// A named, ordered list of rules
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    pub name: &'static str,
    pub description: &'static str,
    build: fn() -> Result<Vec<Rule>, RewriteError>,
}

impl RuleSet {
    /// Compile the set's rules
    pub fn rules(&self) -> Result<Vec<Rule>, RewriteError> {
        (self.build)()
    }
}

/// Registry of all built-in rule sets
pub struct RuleSetRegistry {
    sets: Vec<RuleSet>,
}

impl RuleSetRegistry {
    /// Create a new registry with all built-in sets
    pub fn new() -> Self {
        let mut registry = Self { sets: Vec::new() };

        registry.register(RuleSet {
            name: "search-provider",
            description: "Move drafts handlers onto the search and workspace providers",
            build: drafts::provider::rules,
        });
        registry.register(RuleSet {
            name: "search-provider-fixups",
            description: "Fix signatures left over after the provider migration",
            build: drafts::fixups::rules,
        });
        registry.register(RuleSet {
            name: "drafts-migration",
            description: "search-provider followed by search-provider-fixups",
            build: drafts::migration,
        });

        registry
    }

    /// Register a new set
    pub fn register(&mut self, set: RuleSet) {
        self.sets.push(set);
    }

    /// Get all set names
    pub fn names(&self) -> Vec<&'static str> {
        self.sets.iter().map(|s| s.name).collect()
    }

    /// Get all sets (for --list-sets)
    pub fn list(&self) -> &[RuleSet] {
        &self.sets
    }

    pub fn get(&self, name: &str) -> Option<&RuleSet> {
        self.sets.iter().find(|s| s.name == name)
    }

    /// Compile the rules of the named set
    pub fn rules(&self, name: &str) -> Result<Vec<Rule>, RuleSetError> {
        let set = self
            .get(name)
            .ok_or_else(|| RuleSetError::Unknown {
                name: name.to_string(),
                available: self.names(),
            })?;
        Ok(set.rules()?)
    }
}

impl Default for RuleSetRegistry {
    fn default() -> Self {
        Self::new()
    }
}
