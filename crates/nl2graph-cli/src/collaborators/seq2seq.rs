//! Fine-tuned seq2seq model behind an HTTP inference server.
//!
//! The server takes `{"question": ...}` and answers `{"query": ...}`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use nl2graph_core::errors::CollaboratorError;
use nl2graph_core::traits::{GenerationOutput, Generator};
use nl2graph_core::{Nl2GraphConfig, RunConfig, Schema};
use serde_json::{json, Map, Value};

use super::{http_client, send_json};

pub struct Seq2seqGenerator {
    client: reqwest::blocking::Client,
    endpoint: String,
    timeout: Duration,
}

pub fn build(config: &Nl2GraphConfig, run: &RunConfig) -> Result<Arc<dyn Generator>> {
    let model = config
        .seq2seq
        .models
        .get(&run.model)
        .ok_or_else(|| anyhow!("seq2seq model '{}' is not configured", run.model))?;
    let timeout = Duration::from_secs(model.effective_timeout_secs());
    Ok(Arc::new(Seq2seqGenerator {
        client: http_client(timeout)?,
        endpoint: model.endpoint.clone(),
        timeout,
    }))
}

impl Generator for Seq2seqGenerator {
    fn generate(
        &self,
        question: &str,
        _schema: Option<&Schema>,
    ) -> Result<GenerationOutput, CollaboratorError> {
        let started = Instant::now();
        let request = self.client.post(&self.endpoint).json(&json!({ "question": question }));
        let response = send_json(request, self.timeout)?;
        parse_prediction(&response, started.elapsed())
    }
}

fn parse_prediction(response: &Value, elapsed: Duration) -> Result<GenerationOutput, CollaboratorError> {
    let query = response
        .get("query")
        .and_then(Value::as_str)
        .ok_or_else(|| CollaboratorError::Backend("prediction has no \"query\" field".into()))?;
    let mut stats = Map::new();
    stats.insert("duration".into(), json!(elapsed.as_secs_f64()));
    Ok(GenerationOutput {
        content: query.to_string(),
        stats: Some(stats),
    })
}
