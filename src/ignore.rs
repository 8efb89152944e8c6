//! Hostmask list matching.
//!
//! A hostmask list is a space, comma or newline separated set of glob
//! patterns such as `*!*@bad.host` or `troll!*@*`. The whole list compiles
//! into one anchored, case-insensitive regex. In a pattern, `*` stops at
//! whichever of `!` and `@` the pattern itself spells out, so `*!*@host`
//! cannot let the nick wildcard swallow the username. A pattern with
//! neither separator matches with a plain `.*`.

use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Compiled hostmask list.
#[derive(Debug, Clone, Default)]
pub struct HostmaskSet {
    regex: Option<Regex>,
}

impl HostmaskSet {
    /// Compile a hostmask list. An empty list matches nothing.
    pub fn new(list: &str) -> Self {
        let patterns: Vec<String> = list
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|p| !p.is_empty())
            .map(pattern_to_regex)
            .collect();

        if patterns.is_empty() {
            return Self::default();
        }

        let source = format!("^(?:{})$", patterns.join("|"));
        match RegexBuilder::new(&source).case_insensitive(true).build() {
            Ok(regex) => Self { regex: Some(regex) },
            Err(e) => {
                warn!(list = %list, error = %e, "hostmask list did not compile");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.regex.is_none()
    }

    /// Whether `nick!user@host` matches any pattern.
    pub fn matches(&self, hostmask: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(hostmask))
    }
}

fn pattern_to_regex(pattern: &str) -> String {
    let star = match (pattern.contains('!'), pattern.contains('@')) {
        (true, true) => "[^!@]*",
        (true, false) => "[^!]*",
        (false, true) => "[^@]*",
        (false, false) => ".*",
    };

    let mut out = String::with_capacity(pattern.len() * 2);
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(star),
            '\\' | '^' | '$' | '.' | '[' | ']' | '|' | '(' | ')' | '?' | '+' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
