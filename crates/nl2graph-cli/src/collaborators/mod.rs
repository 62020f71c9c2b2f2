//! Concrete generators and executors, picked from a capability table by
//! method (generation) and query language (execution).

mod llm;
mod neo4j;
mod seq2seq;
mod sparql;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use nl2graph_core::config::{DatasetConfig, EndpointConfig};
use nl2graph_core::errors::{CollaboratorError, ConfigError};
use nl2graph_core::traits::{Executor, Generator};
use nl2graph_core::{Method, Nl2GraphConfig, RunConfig};
use nl2graph_pipeline::Collaborators;
use serde_json::Value;

type GeneratorFactory = fn(&Nl2GraphConfig, &RunConfig) -> Result<Arc<dyn Generator>>;
type ExecutorFactory = fn(&EndpointConfig) -> Result<Arc<dyn Executor>>;

const GENERATORS: &[(Method, GeneratorFactory)] = &[
    (Method::Llm, llm::build),
    (Method::Seq2seq, seq2seq::build),
];

const EXECUTORS: &[(&str, ExecutorFactory)] = &[("cypher", neo4j::build), ("sparql", sparql::build)];

pub fn for_generation(config: &Nl2GraphConfig, run: &RunConfig) -> Result<Collaborators> {
    let build = GENERATORS
        .iter()
        .find(|(method, _)| *method == run.method)
        .map(|(_, build)| build)
        .ok_or_else(|| anyhow!("no generator for method '{}'", run.method))?;
    Ok(Collaborators::default().with_generator(build(config, run)?))
}

pub fn for_execution(dataset: &DatasetConfig, run: &RunConfig) -> Result<Collaborators> {
    let build = EXECUTORS
        .iter()
        .find(|(lang, _)| *lang == run.lang)
        .map(|(_, build)| build)
        .ok_or_else(|| anyhow!("no executor for query language '{}'", run.lang))?;
    let endpoint = dataset.endpoints.get(&run.lang).ok_or_else(|| {
        ConfigError::MissingKey(format!("endpoint for query language '{}'", run.lang))
    })?;
    Ok(Collaborators::default().with_executor(build(endpoint)?))
}

// ─── HTTP plumbing shared by every collaborator ─────────────────────

fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder().timeout(timeout).build()?)
}

/// Timeouts keep their own variant. Anything else reports the innermost
/// cause, e.g. `Connection refused (os error 111)`.
fn request_error(e: reqwest::Error, timeout: Duration) -> CollaboratorError {
    if e.is_timeout() {
        return CollaboratorError::Timeout { after: timeout };
    }
    let mut cause: &dyn std::error::Error = &e;
    while let Some(next) = cause.source() {
        cause = next;
    }
    CollaboratorError::Transport(cause.to_string())
}

/// Send a request and decode a JSON body, mapping non-2xx to `Http`.
fn send_json(
    request: reqwest::blocking::RequestBuilder,
    timeout: Duration,
) -> Result<Value, CollaboratorError> {
    let response = request.send().map_err(|e| request_error(e, timeout))?;
    let status = response.status();
    if !status.is_success() {
        let message = response.text().unwrap_or_default();
        return Err(CollaboratorError::Http {
            status: status.as_u16(),
            message,
        });
    }
    response.json().map_err(|e| request_error(e, timeout))
}

fn env_secret(name: Option<&str>) -> Result<Option<String>> {
    match name {
        None => Ok(None),
        Some(var) => std::env::var(var)
            .map(Some)
            .map_err(|_| anyhow!("environment variable {var} is not set")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_has_no_executor() {
        let run = RunConfig::new(Method::Llm, "gremlin", "m");
        let err = for_execution(&DatasetConfig::default(), &run).err().unwrap();
        assert!(err.to_string().contains("gremlin"));
    }

    #[test]
    fn executor_requires_an_endpoint() {
        let run = RunConfig::new(Method::Llm, "cypher", "m");
        let err = for_execution(&DatasetConfig::default(), &run).err().unwrap();
        assert!(err.to_string().contains("endpoint"));
    }

    #[test]
    fn configured_endpoint_builds_an_executor() {
        let mut dataset = DatasetConfig::default();
        dataset.endpoints.insert(
            "sparql".into(),
            EndpointConfig {
                url: "http://localhost:3030/ds/sparql".into(),
                ..EndpointConfig::default()
            },
        );
        let run = RunConfig::new(Method::Seq2seq, "sparql", "t5");
        let collaborators = for_execution(&dataset, &run).unwrap();
        assert!(collaborators.executor.is_some());
        assert!(collaborators.generator.is_none());
    }
}
