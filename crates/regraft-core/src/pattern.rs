//! Pattern matching over a text buffer
//!
//! Two kinds of pattern are supported:
//!
//! - **Regex patterns** use the `regex` crate syntax. Tabs, newlines and spaces in
//!   the pattern are ordinary literal characters, so indentation is part of what a
//!   rule matches. Dot-matches-newline is opt-in per pattern.
//! - **Balanced call patterns** pair a `head` regex that ends in an opening
//!   parenthesis with a depth-tracking scan to the matching closing parenthesis.
//!   The argument list becomes a capture group named `args`, so nested calls in
//!   the arguments are captured whole.
//!
//! A negated character class such as `([^)]+)` in a regex pattern is *not*
//! balanced-delimiter aware: it stops at the first `)` even when that parenthesis
//! closes a nested call. Use a balanced call pattern when a rule has to capture an
//! entire argument list.
//!
//! Matches returned by [`Pattern::find_all`] never overlap and are ordered left to
//! right. Which of two overlapping candidates wins is decided by the regex
//! engine's leftmost-first semantics.

use regex::{Captures, Regex, RegexBuilder};
use std::sync::Arc;
use thiserror::Error;

/// Name of the capture group holding a balanced call's argument list
pub const ARGS_GROUP: &str = "args";

/// Errors raised while compiling a pattern
#[derive(Error, Debug)]
pub enum PatternError {
    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error("call head `{0}` must end with an escaped opening parenthesis `\\(`")]
    HeadWithoutParen(String),

    #[error("capture group `{0}` is defined more than once")]
    DuplicateGroup(String),
}

/// One occurrence of a pattern in a buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Byte offset of the first matched byte
    pub start: usize,
    /// Byte offset one past the last matched byte
    pub end: usize,
    groups: Vec<Option<String>>,
    names: Arc<[Option<String>]>,
}

impl Match {
    /// The full matched text
    pub fn as_str(&self) -> &str {
        self.get(0).unwrap_or_default()
    }

    /// Text of group `index`; index 0 is the whole match
    ///
    /// Returns `None` for groups that exist but did not participate in the match,
    /// and for indices past the last group.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }

    /// Text of the group called `name`
    pub fn name(&self, name: &str) -> Option<&str> {
        let index = self
            .names
            .iter()
            .position(|n| n.as_deref() == Some(name))?;
        self.get(index)
    }
}

#[derive(Debug, Clone)]
enum Kind {
    Regex(Regex),
    Call { head: Regex, tail: Option<Regex> },
}

/// A compiled pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    kind: Kind,
    guard: Option<Regex>,
    names: Arc<[Option<String>]>,
    source: String,
}

impl Pattern {
    /// Compile a regex pattern
    pub fn regex(source: &str, dot_all: bool) -> Result<Self, PatternError> {
        let re = build(source, dot_all)?;
        let names: Vec<Option<String>> = re
            .capture_names()
            .map(|n| n.map(str::to_string))
            .collect();

        Ok(Self {
            kind: Kind::Regex(re),
            guard: None,
            names: names.into(),
            source: source.to_string(),
        })
    }

    /// Compile a balanced call pattern
    ///
    /// `head` must end with `\(`. Group numbering is: the head's groups, then the
    /// argument list (also named `args`), then the groups of `tail`, which has to
    /// match immediately after the closing parenthesis.
    pub fn balanced_call(head: &str, tail: Option<&str>, dot_all: bool) -> Result<Self, PatternError> {
        if !head.ends_with(r"\(") {
            return Err(PatternError::HeadWithoutParen(head.to_string()));
        }

        let head_re = build(head, dot_all)?;
        let tail_re = tail.map(|t| build(&format!("^(?:{t})"), dot_all)).transpose()?;

        let mut names: Vec<Option<String>> = head_re
            .capture_names()
            .map(|n| n.map(str::to_string))
            .collect();
        names.push(Some(ARGS_GROUP.to_string()));
        if let Some(tail_re) = &tail_re {
            names.extend(tail_re.capture_names().skip(1).map(|n| n.map(str::to_string)));
        }

        let mut seen: Vec<&str> = Vec::new();
        for name in names.iter().flatten() {
            if seen.contains(&name.as_str()) {
                return Err(PatternError::DuplicateGroup(name.clone()));
            }
            seen.push(name);
        }

        let source = match tail {
            Some(t) => format!("{head}<args>){t}"),
            None => format!("{head}<args>)"),
        };

        Ok(Self {
            kind: Kind::Call {
                head: head_re,
                tail: tail_re,
            },
            guard: None,
            names: names.into(),
            source,
        })
    }

    /// Skip matches whose following text starts with `guard`
    pub fn not_followed_by(mut self, guard: &str) -> Result<Self, PatternError> {
        self.guard = Some(build(&format!("^(?:{guard})"), false)?);
        Ok(self)
    }

    /// Number of capture groups, excluding the whole match
    pub fn group_count(&self) -> usize {
        self.names.len() - 1
    }

    /// Index of the group called `name`
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_deref() == Some(name))
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Find all non-overlapping matches, left to right
    pub fn find_all(&self, text: &str) -> Vec<Match> {
        match &self.kind {
            Kind::Regex(re) => self.find_regex(re, text),
            Kind::Call { head, tail } => self.find_calls(head, tail.as_ref(), text),
        }
    }

    fn find_regex(&self, re: &Regex, text: &str) -> Vec<Match> {
        let mut matches = Vec::new();

        for caps in re.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if self.guarded(text, whole.end()) {
                continue;
            }

            matches.push(Match {
                start: whole.start(),
                end: whole.end(),
                groups: group_texts(&caps, 0),
                names: Arc::clone(&self.names),
            });
        }

        matches
    }

    fn find_calls(&self, head: &Regex, tail: Option<&Regex>, text: &str) -> Vec<Match> {
        let mut matches = Vec::new();
        let mut pos = 0;

        while pos <= text.len() {
            let Some(caps) = head.captures_at(text, pos) else { break };
            let Some(whole) = caps.get(0) else { break };
            let retry = next_boundary(text, whole.start());

            if !whole.as_str().ends_with('(') {
                pos = retry;
                continue;
            }

            let Some(close) = find_closing_paren(text, whole.end()) else {
                pos = retry;
                continue;
            };

            let mut groups = group_texts(&caps, 0);
            groups.push(Some(text[whole.end()..close].to_string()));
            let mut end = close + 1;

            if let Some(tail) = tail {
                let Some(tail_caps) = tail.captures(&text[end..]) else {
                    pos = retry;
                    continue;
                };
                groups.extend(group_texts(&tail_caps, 1));
                end += tail_caps.get(0).map_or(0, |m| m.end());
            }

            if self.guarded(text, end) {
                pos = retry;
                continue;
            }

            // Group 0 spans head, arguments and tail
            groups[0] = Some(text[whole.start()..end].to_string());

            matches.push(Match {
                start: whole.start(),
                end,
                groups,
                names: Arc::clone(&self.names),
            });
            pos = end;
        }

        matches
    }

    fn guarded(&self, text: &str, end: usize) -> bool {
        self.guard
            .as_ref()
            .is_some_and(|guard| guard.is_match(&text[end..]))
    }
}

fn build(source: &str, dot_all: bool) -> Result<Regex, regex::Error> {
    RegexBuilder::new(source).dot_matches_new_line(dot_all).build()
}

fn group_texts(caps: &Captures<'_>, skip: usize) -> Vec<Option<String>> {
    (skip..caps.len())
        .map(|i| caps.get(i).map(|m| m.as_str().to_string()))
        .collect()
}

fn next_boundary(text: &str, offset: usize) -> usize {
    offset + text[offset..].chars().next().map_or(1, char::len_utf8)
}

/// Find the `)` closing a parenthesis opened just before `from`
///
/// Tracks `()`, `[]` and `{}` nesting and skips over double-quoted strings, rune
/// literals, backtick raw strings and `//` / `/* */` comments. Returns `None` when
/// the text ends first or a closer does not match its opener.
pub fn find_closing_paren(text: &str, from: usize) -> Option<usize> {
    let mut stack = vec![')'];
    let mut chars = text[from..].char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '(' => stack.push(')'),
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ')' | ']' | '}' => {
                if stack.pop() != Some(c) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(from + i);
                }
            }
            '"' | '\'' => {
                // Escaped quote or end of text inside a literal: keep scanning
                let mut escaped = false;
                for (_, s) in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if s == '\\' {
                        escaped = true;
                    } else if s == c || s == '\n' {
                        break;
                    }
                }
            }
            '`' => {
                for (_, s) in chars.by_ref() {
                    if s == '`' {
                        break;
                    }
                }
            }
            '/' => match chars.peek() {
                Some((_, '/')) => {
                    for (_, s) in chars.by_ref() {
                        if s == '\n' {
                            break;
                        }
                    }
                }
                Some((_, '*')) => {
                    chars.next();
                    let mut prev = '\0';
                    for (_, s) in chars.by_ref() {
                        if prev == '*' && s == '/' {
                            break;
                        }
                        prev = s;
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    None
}
