//! Input records and equality filters over them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A question/answer record as loaded from the source store.
///
/// Fields other than `id`, `question` and `answer` (for example `hop` or
/// `split`) are preserved in `extra` and round-trip through serde unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub answer: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, question: impl Into<String>, answer: Vec<Value>) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            answer,
            extra: Map::new(),
        }
    }

    /// Builder-style setter for an extra field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Look up a field by name. Covers both the fixed fields and `extra`.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::String(self.id.clone())),
            "question" => Some(Value::String(self.question.clone())),
            "answer" => Some(Value::Array(self.answer.clone())),
            _ => self.extra.get(name).cloned(),
        }
    }
}

/// Conjunction of `field == value` conditions.
///
/// An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    conditions: Vec<(String, Value)>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    /// The `--hop` / `--split` filters of the stage commands. `None` adds nothing.
    pub fn from_hop_split(hop: Option<i64>, split: Option<&str>) -> Self {
        let mut filter = Self::new();
        if let Some(hop) = hop {
            filter = filter.eq("hop", hop);
        }
        if let Some(split) = split {
            filter = filter.eq("split", split);
        }
        filter
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.conditions
            .iter()
            .all(|(field, value)| record.field(field).as_ref() == Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extra_fields_round_trip() {
        let raw = json!({
            "id": "q1",
            "question": "capital of France?",
            "answer": ["Paris"],
            "hop": 1,
            "split": "test"
        });
        let record: Record = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(record.extra.get("hop"), Some(&json!(1)));
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }

    #[test]
    fn filter_matches_fixed_and_extra_fields() {
        let record = Record::new("q1", "q", vec![json!("a")])
            .with_field("hop", 2)
            .with_field("split", "dev");

        assert!(RecordFilter::new().matches(&record));
        assert!(RecordFilter::from_hop_split(Some(2), Some("dev")).matches(&record));
        assert!(!RecordFilter::from_hop_split(Some(1), None).matches(&record));
        assert!(RecordFilter::new().eq("id", "q1").matches(&record));
        assert!(!RecordFilter::new().eq("missing", 1).matches(&record));
    }
}
