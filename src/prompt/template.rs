//! Prompt templates - raw text with `{{name}}` placeholders

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern is valid")
});

/// An immutable prompt template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptTemplate {
    raw: String,
}

impl PromptTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The template text exactly as written
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in left-to-right order, duplicates included
    pub fn placeholders(&self) -> Vec<&str> {
        PLACEHOLDER
            .captures_iter(&self.raw)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect()
    }

    /// Template text with common leading indentation and surrounding blank lines removed
    pub fn normalized(&self) -> String {
        dedent(&self.raw).trim_matches('\n').to_string()
    }

    /// Normalized text with each placeholder replaced by `lookup(name)`
    ///
    /// Substitution is a single pass, so replacement text is never rescanned.
    pub fn fill<F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> String,
    {
        PLACEHOLDER
            .replace_all(&self.normalized(), |caps: &Captures| lookup(&caps[1]))
            .into_owned()
    }
}

impl From<&str> for PromptTemplate {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for PromptTemplate {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// Remove the leading whitespace shared by every non-blank line.
///
/// The margin is the longest common whitespace prefix, so a tab and a space
/// never cancel each other. Whitespace-only lines are emptied and do not count
/// toward the margin.
pub fn dedent(text: &str) -> String {
    let margin = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(indentation)
        .reduce(common_prefix)
        .unwrap_or("");

    text.lines()
        .map(|line| if line.trim().is_empty() { "" } else { &line[margin.len()..] })
        .collect::<Vec<_>>()
        .join("\n")
}

fn indentation(line: &str) -> &str {
    &line[..line.len() - line.trim_start_matches([' ', '\t']).len()]
}

fn common_prefix<'a>(a: &'a str, b: &'a str) -> &'a str {
    let len = a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count();
    &a[..len]
}

/// True if the text still contains `{{name}}` placeholder syntax
pub fn has_placeholders(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}
