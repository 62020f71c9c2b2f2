//! SPARQL 1.1 protocol executor. Results are requested as
//! `application/sparql-results+json`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use nl2graph_core::config::EndpointConfig;
use nl2graph_core::errors::CollaboratorError;
use nl2graph_core::traits::{Executor, Row};
use reqwest::header::ACCEPT;
use serde_json::Value;

use super::{env_secret, http_client, send_json};

const RESULTS_JSON: &str = "application/sparql-results+json";

pub struct SparqlExecutor {
    client: reqwest::blocking::Client,
    url: String,
    credentials: Option<(String, Option<String>)>,
    timeout: Duration,
}

pub fn build(endpoint: &EndpointConfig) -> Result<Arc<dyn Executor>> {
    let timeout = Duration::from_secs(endpoint.effective_timeout_secs());
    let password = env_secret(endpoint.password_env.as_deref())?;
    Ok(Arc::new(SparqlExecutor {
        client: http_client(timeout)?,
        url: endpoint.url.clone(),
        credentials: endpoint.username.clone().map(|user| (user, password)),
        timeout,
    }))
}

impl Executor for SparqlExecutor {
    fn execute(&self, query: &str) -> Result<Vec<Row>, CollaboratorError> {
        let mut request = self
            .client
            .post(&self.url)
            .header(ACCEPT, RESULTS_JSON)
            .form(&[("query", query)]);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, password.as_ref());
        }
        let response = send_json(request, self.timeout)?;
        rows_from_response(&response)
    }
}

/// One row per binding, columns in `head.vars` order. Unbound variables are
/// null. An ASK result becomes a single `boolean` row.
fn rows_from_response(response: &Value) -> Result<Vec<Row>, CollaboratorError> {
    if let Some(answer) = response.get("boolean") {
        let mut row = Row::new();
        row.insert("boolean".into(), answer.clone());
        return Ok(vec![row]);
    }

    let vars: Vec<&str> = response
        .pointer("/head/vars")
        .and_then(Value::as_array)
        .map(|vars| vars.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let bindings = response
        .pointer("/results/bindings")
        .and_then(Value::as_array)
        .ok_or_else(|| CollaboratorError::Backend("response has no results.bindings".into()))?;

    Ok(bindings
        .iter()
        .map(|binding| {
            vars.iter()
                .map(|var| {
                    let value = binding
                        .pointer(&format!("/{var}/value"))
                        .cloned()
                        .unwrap_or(Value::Null);
                    (var.to_string(), value)
                })
                .collect()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bindings_become_rows() {
        let response = json!({
            "head": {"vars": ["film", "year"]},
            "results": {"bindings": [
                {"film": {"type": "literal", "value": "Heat"},
                 "year": {"type": "literal", "value": "1995"}},
                {"film": {"type": "literal", "value": "Ronin"}}
            ]}
        });
        let rows = rows_from_response(&response).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["year"], json!("1995"));
        assert_eq!(rows[1]["year"], Value::Null);
    }

    #[test]
    fn ask_results_yield_a_boolean_row() {
        let rows = rows_from_response(&json!({"head": {}, "boolean": true})).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["boolean"], json!(true));
    }

    #[test]
    fn malformed_response_is_a_backend_error() {
        assert!(rows_from_response(&json!({"head": {"vars": []}})).is_err());
    }
}
