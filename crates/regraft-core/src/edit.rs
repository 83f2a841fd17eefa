//! Byte-range text replacement

use std::ops::Range;
use thiserror::Error;

/// Errors that can occur during edit application
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Overlapping edits detected at offset {0}")]
    OverlappingEdits(usize),

    #[error("Edit span {start}..{end} out of bounds for source length {len}")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Edit span {start}..{end} does not fall on character boundaries")]
    NotCharBoundary { start: usize, end: usize },
}

/// A single replacement of a byte range in a buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// The byte range to replace
    pub span: Range<usize>,
    /// The replacement text, inserted verbatim
    pub replacement: String,
    /// Id of the rule that produced this edit
    pub rule: Option<String>,
}

impl Edit {
    /// Create a new edit
    pub fn new(span: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
            rule: None,
        }
    }

    /// Tag the edit with the id of the rule that produced it
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    pub fn start_offset(&self) -> usize {
        self.span.start
    }

    pub fn end_offset(&self) -> usize {
        self.span.end
    }
}

/// Apply edits to a buffer, producing a new buffer
///
/// Edits may be given in any order; they are validated against each other and
/// against the source before anything is written. Replacement text is copied
/// exactly, with no whitespace adjustment.
///
/// # Returns
/// * `Ok(String)` - The rewritten buffer
/// * `Err(EditError)` - If edits overlap or fall outside the source
pub fn apply_edits(source: &str, edits: &[Edit]) -> Result<String, EditError> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    // Sort edits by start position (ascending) so the output can be built in one pass
    let mut sorted_edits: Vec<&Edit> = edits.iter().collect();
    sorted_edits.sort_by_key(|e| (e.start_offset(), e.end_offset()));

    let source_len = source.len();
    let mut prev_end: Option<usize> = None;

    for edit in &sorted_edits {
        let start = edit.start_offset();
        let end = edit.end_offset();

        if start > end || end > source_len {
            return Err(EditError::SpanOutOfBounds {
                start,
                end,
                len: source_len,
            });
        }

        if !source.is_char_boundary(start) || !source.is_char_boundary(end) {
            return Err(EditError::NotCharBoundary { start, end });
        }

        if let Some(prev) = prev_end {
            if start < prev {
                return Err(EditError::OverlappingEdits(start));
            }
        }

        prev_end = Some(end);
    }

    let grown: usize = sorted_edits.iter().map(|e| e.replacement.len()).sum();
    let mut result = String::with_capacity(source_len + grown);
    let mut cursor = 0;

    for edit in sorted_edits {
        result.push_str(&source[cursor..edit.start_offset()]);
        result.push_str(&edit.replacement);
        cursor = edit.end_offset();
    }
    result.push_str(&source[cursor..]);

    Ok(result)
}

/// Get line number (1-based) for a byte offset
pub fn offset_to_line(source: &str, offset: usize) -> usize {
    source.as_bytes()[..offset.min(source.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}
