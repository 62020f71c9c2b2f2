//! Pull a query out of free-form generator output.

use std::sync::OnceLock;

use regex::Regex;

const PATTERNS: &[&str] = &[
    // Fenced block, optionally tagged with the query language.
    r"(?is)```(?:cypher|sparql|gremlin|sql)?\s*\n?(.*?)```",
    // Inline backticks.
    r"`([^`]+)`",
];

fn patterns() -> &'static [Regex] {
    static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();
    COMPILED.get_or_init(|| PATTERNS.iter().filter_map(|p| Regex::new(p).ok()).collect())
}

/// The first fenced block, else the first inline code span, else the
/// trimmed input.
pub fn extract_query(raw: &str) -> String {
    for pattern in patterns() {
        if let Some(found) = pattern.captures(raw).and_then(|c| c.get(1)) {
            return found.as_str().trim().to_string();
        }
    }
    raw.trim().to_string()
}
