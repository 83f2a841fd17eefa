//! Replacement templates
//!
//! A template is literal text with group references:
//!
//! - `$1`, `$12`: positional group (all following digits are read)
//! - `${1}`, `${name}`: braced positional or named group
//! - `$$`: a literal `$`
//!
//! Any other `$` is copied as is. Everything else, including tabs and newlines,
//! is emitted exactly as written; no re-indentation happens.

use crate::pattern::{Match, Pattern};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Index(usize),
    Name(String),
}

/// A parsed replacement template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
    source: String,
}

/// A group reference a pattern cannot satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingGroup(pub String);

impl Template {
    /// Parse a template string
    ///
    /// Fails only on an unterminated or empty `${...}` reference.
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(pos) = rest.find('$') {
            literal.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            if let Some(stripped) = after.strip_prefix('$') {
                literal.push('$');
                rest = stripped;
            } else if let Some(braced) = after.strip_prefix('{') {
                let close = braced
                    .find('}')
                    .ok_or_else(|| format!("unterminated group reference at byte {pos}"))?;
                let reference = &braced[..close];
                if reference.is_empty() {
                    return Err(format!("empty group reference at byte {pos}"));
                }
                flush(&mut literal, &mut segments);
                segments.push(match reference.parse::<usize>() {
                    Ok(index) => Segment::Index(index),
                    Err(_) => Segment::Name(reference.to_string()),
                });
                rest = &braced[close + 1..];
            } else {
                let digits = after.bytes().take_while(u8::is_ascii_digit).count();
                if digits == 0 {
                    literal.push('$');
                    rest = after;
                    continue;
                }
                let index = after[..digits]
                    .parse::<usize>()
                    .map_err(|e| format!("bad group index at byte {pos}: {e}"))?;
                flush(&mut literal, &mut segments);
                segments.push(Segment::Index(index));
                rest = &after[digits..];
            }
        }

        literal.push_str(rest);
        flush(&mut literal, &mut segments);

        Ok(Self {
            segments,
            source: source.to_string(),
        })
    }

    /// Check that every reference names a group the pattern defines
    pub fn check(&self, pattern: &Pattern) -> Result<(), MissingGroup> {
        for segment in &self.segments {
            match segment {
                Segment::Index(i) if *i > pattern.group_count() => {
                    return Err(MissingGroup(i.to_string()));
                }
                Segment::Name(name) if pattern.group_index(name).is_none() => {
                    return Err(MissingGroup(name.clone()));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Expand the template against a match
    ///
    /// Groups that did not participate in the match expand to nothing.
    pub fn expand(&self, m: &Match) -> String {
        let mut out = String::with_capacity(self.source.len() + m.as_str().len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Index(i) => out.push_str(m.get(*i).unwrap_or_default()),
                Segment::Name(name) => out.push_str(m.name(name).unwrap_or_default()),
            }
        }
        out
    }

    /// The template as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the template expands to the empty string
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

fn flush(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_match(pattern: &Pattern, text: &str) -> Match {
        pattern.find_all(text).into_iter().next().unwrap()
    }

    #[test]
    fn test_positional_refs() {
        let pattern = Pattern::regex(r"ar\.Drafts\.GetObject\(([^,]+),\s*(&\w+)\)", false).unwrap();
        let template = Template::parse("searchProvider.DraftIndex().GetObject(ctx, $1, $2)").unwrap();
        let m = first_match(&pattern, "err = ar.Drafts.GetObject(f.Id, &docObj)");

        assert_eq!(
            template.expand(&m),
            "searchProvider.DraftIndex().GetObject(ctx, f.Id, &docObj)"
        );
    }

    #[test]
    fn test_braced_and_named_refs() {
        let pattern = Pattern::regex(r"&(?P<dest>\w+)", false).unwrap();
        let template = Template::parse("${dest}Doc, ${1}").unwrap();
        let m = first_match(&pattern, "&algoDoc");

        assert_eq!(template.expand(&m), "algoDocDoc, algoDoc");
    }

    #[test]
    fn test_whitespace_emitted_verbatim() {
        let pattern = Pattern::regex(r"(\{)", false).unwrap();
        let template = Template::parse("$1\n\t\tctx := r.Context()").unwrap();
        let m = first_match(&pattern, "{");

        assert_eq!(template.expand(&m), "{\n\t\tctx := r.Context()");
    }

    #[test]
    fn test_dollar_escapes() {
        let pattern = Pattern::regex(r"(x)", false).unwrap();
        let template = Template::parse("$$1 costs $ and $1").unwrap();
        let m = first_match(&pattern, "x");

        assert_eq!(template.expand(&m), "$1 costs $ and x");
    }

    #[test]
    fn test_empty_template() {
        let template = Template::parse("").unwrap();
        assert!(template.is_empty());
    }

    #[test]
    fn test_unterminated_reference() {
        assert!(Template::parse("${name").is_err());
        assert!(Template::parse("${}").is_err());
    }

    #[test]
    fn test_check_reports_missing_groups() {
        let pattern = Pattern::regex(r"(a)(?P<b>b)", false).unwrap();

        assert!(Template::parse("$1 $2 ${b}").unwrap().check(&pattern).is_ok());
        assert_eq!(
            Template::parse("$3").unwrap().check(&pattern),
            Err(MissingGroup("3".to_string()))
        );
        assert_eq!(
            Template::parse("${c}").unwrap().check(&pattern),
            Err(MissingGroup("c".to_string()))
        );
    }

    #[test]
    fn test_optional_group_expands_empty() {
        let pattern = Pattern::regex(r"a(b)?", false).unwrap();
        let template = Template::parse("[$1]").unwrap();
        let m = first_match(&pattern, "a");

        assert_eq!(template.expand(&m), "[]");
    }
}
