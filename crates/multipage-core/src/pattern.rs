//! Simple wildcard patterns used by page configs.
//!
//! `**` matches any run of characters, `*` any run without `/`. Everything
//! else is literal and the whole text must match.

use regex::Regex;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct SimplePattern {
    regex: Regex,
}

impl SimplePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&to_regex(pattern)).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// One-shot match. Patterns that fail to compile match nothing.
pub fn simple_match(pattern: &str, text: &str) -> bool {
    match SimplePattern::new(pattern) {
        Ok(compiled) => compiled.is_match(text),
        Err(err) => {
            tracing::debug!(%err, "ignoring pattern");
            false
        }
    }
}

fn to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '*' {
            literal.push(c);
            continue;
        }
        out.push_str(&regex::escape(&literal));
        literal.clear();
        if chars.peek() == Some(&'*') {
            chars.next();
            out.push_str(".*");
        } else {
            out.push_str("[^/]*");
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');
    out
}

/// Whether a glob segment contains wildcard syntax.
pub fn has_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?', '[', '{'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_star_stops_at_separator() {
        assert!(simple_match("admin/*", "admin/users"));
        assert!(!simple_match("admin/*", "admin/users/list"));
        assert!(simple_match("mobile-*", "mobile-home"));
    }

    #[test]
    fn double_star_crosses_separators() {
        assert!(simple_match("src/pages/**", "src/pages/a/b/main.ts"));
        assert!(simple_match("**/main.ts", "src/pages/mobile/main.ts"));
    }

    #[test]
    fn match_is_anchored() {
        assert!(!simple_match("home", "homepage"));
        assert!(!simple_match("*page", "pages"));
        assert!(simple_match("home", "home"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert!(simple_match("a.b", "a.b"));
        assert!(!simple_match("a.b", "axb"));
        assert!(simple_match("(x)+", "(x)+"));
    }

    #[test]
    fn wildcard_detection() {
        assert!(has_wildcard("*.{ts,js}"));
        assert!(has_wildcard("**"));
        assert!(!has_wildcard("pages"));
    }
}
