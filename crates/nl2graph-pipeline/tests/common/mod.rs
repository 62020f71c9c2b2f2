#![allow(dead_code)]

use std::sync::Arc;

use nl2graph_core::traits::storage::IResultStore;
use nl2graph_core::{IfExists, Method, Record, RunConfig};
use nl2graph_pipeline::testing::{MapExecutor, ScriptedGenerator};
use nl2graph_pipeline::{Collaborators, Orchestrator, PipelineSettings};
use serde_json::json;

pub fn run_config() -> RunConfig {
    RunConfig::new(Method::Llm, "cypher", "test-model")
}

/// q1 answers exactly, q2 partially, q3 hits a backend error.
pub fn records() -> Vec<Record> {
    vec![
        Record::new("q1", "capital of France", vec![json!("Paris")]).with_field("hop", 1),
        Record::new("q2", "films by Nolan", vec![json!("a"), json!("b"), json!("c")])
            .with_field("hop", 2),
        Record::new("q3", "unreachable", vec![json!("x")]).with_field("hop", 2),
    ]
}

/// `n` records cycling through the three questions of [`records`], so a
/// batch mixes exact, partial and failed executions.
pub fn many_records(n: usize) -> Vec<Record> {
    let shapes = records();
    (0..n)
        .map(|i| {
            let shape = &shapes[i % shapes.len()];
            Record::new(format!("r{i:04}"), shape.question.clone(), shape.answer.clone())
                .with_field("hop", (i % 3) as i64 + 1)
        })
        .collect()
}

pub fn executor() -> MapExecutor {
    MapExecutor::new()
        .values("QUERY capital of France", vec![json!("Paris")])
        .values("QUERY films by Nolan", vec![json!("a"), json!("b")])
        .fail("QUERY unreachable", "Connection refused")
}

pub fn settings(workers: usize, if_exists: IfExists) -> PipelineSettings {
    PipelineSettings {
        workers,
        if_exists,
        ..PipelineSettings::default()
    }
}

pub fn orchestrator(
    store: Arc<dyn IResultStore>,
    settings: &PipelineSettings,
    generator: Arc<ScriptedGenerator>,
    executor: Arc<MapExecutor>,
) -> Orchestrator {
    let collaborators = Collaborators::default()
        .with_generator(generator)
        .with_executor(executor);
    Orchestrator::new(store, run_config(), settings, collaborators).unwrap()
}
