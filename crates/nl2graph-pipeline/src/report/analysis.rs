//! Error breakdown for failed executions.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use nl2graph_core::ResultRow;
use regex::Regex;
use serde::Serialize;

const MISSING_RELATION_PATTERNS: &[&str] = &[
    r"(?i)Unknown relationship type '([^']+)'",
    r"(?i)Relationship type `([^`]+)` not found",
    r"(?i)relationship type (\w+) does not exist",
    r"(?i)\[:(\w+)\].*not found",
];

fn missing_relation_patterns() -> &'static [Regex] {
    static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        MISSING_RELATION_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorAnalysis {
    pub total_errors: usize,
    /// Relationship types the database reported as unknown, sorted.
    pub missing_relations: Vec<String>,
    /// category → count
    pub error_types: BTreeMap<String, usize>,
}

/// Bucket an execution error message. First matching keyword wins.
pub fn classify_error(error: &str) -> &'static str {
    let lower = error.to_lowercase();
    let has = |needle: &str| lower.contains(needle);
    if has("timeout") || has("timed out") {
        "timeout"
    } else if has("connection") {
        "connection"
    } else if has("syntax") {
        "syntax"
    } else if has("relationship") || has("rel_type") {
        "missing_relationship"
    } else if has("label") || has("node") {
        "missing_label"
    } else if has("property") {
        "missing_property"
    } else if has("no query") {
        "no_query"
    } else {
        "other"
    }
}

impl ErrorAnalysis {
    pub fn from_rows(rows: &[&ResultRow]) -> Self {
        let mut analysis = Self::default();
        let mut missing = BTreeSet::new();

        let failures = rows
            .iter()
            .filter_map(|r| r.exec.as_ref())
            .filter(|e| !e.success);
        for exec in failures {
            analysis.total_errors += 1;
            let error = exec.error.as_deref().unwrap_or("");
            *analysis
                .error_types
                .entry(classify_error(error).to_string())
                .or_default() += 1;
            for pattern in missing_relation_patterns() {
                if let Some(m) = pattern.captures(error).and_then(|c| c.get(1)) {
                    missing.insert(m.as_str().to_string());
                }
            }
        }

        analysis.missing_relations = missing.into_iter().collect();
        analysis
    }
}
