//! Set-based answer scoring.
//!
//! Answers are stringified, trimmed and lowercased into sets; nulls are
//! dropped. Duplicates and ordering do not matter.

use std::collections::BTreeSet;

use nl2graph_core::traits::Scorer;
use nl2graph_core::Metrics;
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct SetScorer;

/// Normalize a list of answers into a comparable set.
pub fn normalize_answers(answers: &[Value]) -> BTreeSet<String> {
    answers
        .iter()
        .filter_map(|value| match value {
            Value::Null => None,
            Value::String(s) => Some(s.trim().to_lowercase()),
            other => Some(other.to_string().trim().to_lowercase()),
        })
        .collect()
}

impl Scorer for SetScorer {
    fn score(&self, gold: &[Value], predicted: &[Value]) -> Metrics {
        let gold = normalize_answers(gold);
        let pred = normalize_answers(predicted);

        let exact_match = if gold == pred { 1.0 } else { 0.0 };
        if gold.is_empty() || pred.is_empty() {
            return Metrics {
                exact_match,
                ..Metrics::default()
            };
        }

        let hits = gold.intersection(&pred).count() as f64;
        let precision = hits / pred.len() as f64;
        let recall = hits / gold.len() as f64;
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Metrics {
            exact_match,
            precision,
            recall,
            f1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_sets_score_perfectly() {
        let m = SetScorer.score(&[json!("Paris")], &[json!(" paris ")]);
        assert_eq!(m.exact_match, 1.0);
        assert_eq!(m.f1, 1.0);
    }

    #[test]
    fn partial_prediction() {
        let m = SetScorer.score(
            &[json!("A"), json!("B"), json!("C")],
            &[json!("A"), json!("B")],
        );
        assert_eq!(m.exact_match, 0.0);
        assert!(close(m.precision, 1.0));
        assert!(close(m.recall, 2.0 / 3.0));
        assert!(close(m.f1, 0.8));
    }

    #[test]
    fn empty_prediction_scores_zero() {
        let m = SetScorer.score(&[json!("A")], &[]);
        assert_eq!(m, Metrics::default());
        let m = SetScorer.score(&[], &[json!("A")]);
        assert_eq!((m.precision, m.recall, m.f1), (0.0, 0.0, 0.0));
    }

    #[test]
    fn non_string_values_are_stringified_and_nulls_dropped() {
        let m = SetScorer.score(&[json!(1984), json!(true)], &[json!("1984"), json!("TRUE"), json!(null)]);
        assert_eq!(m.exact_match, 1.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn metrics_stay_in_unit_range(
            gold in prop::collection::vec("[a-d]{1,2}", 0..6),
            pred in prop::collection::vec("[a-d]{1,2}", 0..6),
        ) {
            let gold: Vec<Value> = gold.into_iter().map(Value::String).collect();
            let pred: Vec<Value> = pred.into_iter().map(Value::String).collect();
            let m = SetScorer.score(&gold, &pred);
            for v in [m.exact_match, m.precision, m.recall, m.f1] {
                prop_assert!((0.0..=1.0).contains(&v));
            }
            prop_assert!(m.f1 <= m.precision.max(m.recall) + 1e-9);
        }
    }
}
