//! Drafts handler migration from the Algolia client and Google Workspace
//! service to the search and workspace provider interfaces
//!
//! The migration runs in two stages. [`provider`] swaps the call sites;
//! [`fixups`] repairs the signature differences that swap leaves behind.

pub mod fixups;
pub mod provider;

use regraft_core::{Rule, RewriteError};

/// Both stages, in order
pub fn migration() -> Result<Vec<Rule>, RewriteError> {
    let mut rules = provider::rules()?;
    rules.extend(fixups::rules()?);
    Ok(rules)
}
