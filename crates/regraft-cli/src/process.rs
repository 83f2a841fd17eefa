//! File processing logic for regraft

use anyhow::{Context, Result};
use regraft_core::{ChangeReport, RuleEngine};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Result of processing a single file
#[derive(Debug)]
pub struct ProcessResult {
    /// Original source code
    pub old_source: String,
    /// Source code after every rule has run
    pub new_source: String,
    pub report: ChangeReport,
}

impl ProcessResult {
    pub fn has_changes(&self) -> bool {
        self.old_source != self.new_source
    }
}

/// Run the engine over a file; nothing is written
pub fn process_file(path: &Path, engine: &RuleEngine) -> Result<ProcessResult> {
    let old_source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let (new_source, report) = engine
        .run(&old_source)
        .with_context(|| format!("Failed to rewrite {}", path.display()))?;

    debug!(
        path = %path.display(),
        matches = report.total_matches(),
        "processed file"
    );

    Ok(ProcessResult {
        old_source,
        new_source,
        report,
    })
}

/// Replace the file's contents atomically
///
/// The new content goes to a temporary file in the same directory, which is
/// then renamed over the original. The original's permissions are kept.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    temp.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write temporary file for {}", path.display()))?;

    if let Ok(metadata) = std::fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .with_context(|| format!("Failed to copy permissions of {}", path.display()))?;
    }

    temp.persist(path)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(())
}
