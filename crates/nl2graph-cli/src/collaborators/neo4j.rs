//! Cypher over the Neo4j HTTP transactional endpoint
//! (`POST /db/<database>/tx/commit`).

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use nl2graph_core::config::EndpointConfig;
use nl2graph_core::errors::CollaboratorError;
use nl2graph_core::traits::{Executor, Row};
use serde_json::{json, Value};

use super::{env_secret, http_client, send_json};

pub struct Neo4jExecutor {
    client: reqwest::blocking::Client,
    url: String,
    credentials: Option<(String, Option<String>)>,
    timeout: Duration,
}

pub fn build(endpoint: &EndpointConfig) -> Result<Arc<dyn Executor>> {
    let timeout = Duration::from_secs(endpoint.effective_timeout_secs());
    let password = env_secret(endpoint.password_env.as_deref())?;
    Ok(Arc::new(Neo4jExecutor {
        client: http_client(timeout)?,
        url: format!(
            "{}/db/{}/tx/commit",
            endpoint.url.trim_end_matches('/'),
            endpoint.effective_database()
        ),
        credentials: endpoint.username.clone().map(|user| (user, password)),
        timeout,
    }))
}

impl Executor for Neo4jExecutor {
    fn execute(&self, query: &str) -> Result<Vec<Row>, CollaboratorError> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&json!({ "statements": [{ "statement": query }] }));
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, password.as_ref());
        }
        let response = send_json(request, self.timeout)?;
        rows_from_response(&response)
    }
}

/// Zip each data row with the statement's columns. A reported error wins
/// over any partial data.
fn rows_from_response(response: &Value) -> Result<Vec<Row>, CollaboratorError> {
    if let Some(error) = response.pointer("/errors/0") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown Neo4j error");
        return Err(CollaboratorError::Backend(message.to_string()));
    }

    let Some(result) = response.pointer("/results/0") else {
        return Ok(Vec::new());
    };
    let columns: Vec<&str> = result
        .get("columns")
        .and_then(Value::as_array)
        .map(|cols| cols.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let data = result.get("data").and_then(Value::as_array);

    let rows = data
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.get("row").and_then(Value::as_array))
        .map(|values| {
            columns
                .iter()
                .zip(values)
                .map(|(col, v)| (col.to_string(), v.clone()))
                .collect::<Row>()
        })
        .collect();
    Ok(rows)
}
