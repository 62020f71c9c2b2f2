//! Aggregate reporting over evaluated results.
//!
//! Accuracy and averages are taken over records whose execution succeeded;
//! failed or missing executions count toward `error_count` instead.

pub mod analysis;
pub mod markdown;

use std::collections::BTreeMap;

use nl2graph_core::{Record, ResultRow};
use serde::Serialize;
use serde_json::Value;

pub use analysis::ErrorAnalysis;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub error_count: usize,
    pub accuracy: f64,
    pub avg_f1: f64,
    pub avg_precision: f64,
    pub avg_recall: f64,

    pub total_duration: f64,
    pub avg_duration: f64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_cached_tokens: u64,
    pub avg_input_tokens: f64,
    pub avg_output_tokens: f64,
    pub avg_cached_tokens: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub run_id: String,
    pub total: usize,
    pub summary: GroupStats,
    /// field name → field value → stats
    pub by_field: BTreeMap<String, BTreeMap<String, GroupStats>>,
    pub errors: ErrorAnalysis,
}

impl Report {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_markdown(&self) -> String {
        markdown::render(self)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Reporting;

fn ratio(num: f64, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num / den as f64
    }
}

fn stat_f64(stats: &serde_json::Map<String, Value>, name: &str) -> f64 {
    stats.get(name).and_then(Value::as_f64).unwrap_or(0.0)
}

fn stat_u64(stats: &serde_json::Map<String, Value>, name: &str) -> u64 {
    stats
        .get(name)
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f as u64)))
        .unwrap_or(0)
}

/// Group key for a record field value. Strings render bare.
fn group_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Reporting {
    pub fn generate(&self, pairs: &[(Record, ResultRow)], run_id: &str, group_by: &[String]) -> Report {
        let rows: Vec<&ResultRow> = pairs.iter().map(|(_, r)| r).collect();

        let by_field = group_by
            .iter()
            .map(|field| (field.clone(), self.by_field(pairs, field)))
            .collect();

        Report {
            run_id: run_id.to_string(),
            total: pairs.len(),
            summary: self.stats(&rows),
            by_field,
            errors: ErrorAnalysis::from_rows(&rows),
        }
    }

    pub fn stats(&self, rows: &[&ResultRow]) -> GroupStats {
        let mut s = GroupStats {
            count: rows.len(),
            ..GroupStats::default()
        };
        let mut correct = 0usize;
        let (mut sum_f1, mut sum_p, mut sum_r) = (0.0, 0.0, 0.0);
        let mut gen_count = 0usize;

        for row in rows {
            if let Some(stats) = row.gen.as_ref().and_then(|g| g.stats.as_ref()) {
                s.total_duration += stat_f64(stats, "duration");
                s.total_input_tokens += stat_u64(stats, "input_tokens");
                s.total_output_tokens += stat_u64(stats, "output_tokens");
                s.total_cached_tokens += stat_u64(stats, "cached_tokens");
                gen_count += 1;
            }

            if !row.exec.as_ref().is_some_and(|e| e.success) {
                s.error_count += 1;
                continue;
            }

            if let Some(eval) = &row.eval {
                if eval.exact_match == Some(1.0) {
                    correct += 1;
                }
                sum_f1 += eval.f1.unwrap_or(0.0);
                sum_p += eval.precision.unwrap_or(0.0);
                sum_r += eval.recall.unwrap_or(0.0);
            }
        }

        let valid = s.count - s.error_count;
        s.accuracy = ratio(correct as f64, valid);
        s.avg_f1 = ratio(sum_f1, valid);
        s.avg_precision = ratio(sum_p, valid);
        s.avg_recall = ratio(sum_r, valid);
        s.avg_duration = ratio(s.total_duration, gen_count);
        s.avg_input_tokens = ratio(s.total_input_tokens as f64, gen_count);
        s.avg_output_tokens = ratio(s.total_output_tokens as f64, gen_count);
        s.avg_cached_tokens = ratio(s.total_cached_tokens as f64, gen_count);
        s
    }

    fn by_field(&self, pairs: &[(Record, ResultRow)], field: &str) -> BTreeMap<String, GroupStats> {
        let mut grouped: BTreeMap<String, Vec<&ResultRow>> = BTreeMap::new();
        for (record, row) in pairs {
            match record.field(field) {
                Some(Value::Null) | None => {}
                Some(value) => grouped.entry(group_key(&value)).or_default().push(row),
            }
        }
        grouped
            .into_iter()
            .map(|(key, rows)| (key, self.stats(&rows)))
            .collect()
    }
}
