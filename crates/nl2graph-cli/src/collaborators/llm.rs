//! OpenAI-compatible chat completions generator.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use minijinja::{context, Environment};
use nl2graph_core::config::ProviderConfig;
use nl2graph_core::errors::CollaboratorError;
use nl2graph_core::traits::{GenerationOutput, Generator};
use nl2graph_core::{Nl2GraphConfig, RunConfig, Schema};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{env_secret, http_client, send_json};

const DEFAULT_TEMPLATE: &str = "\
You translate questions into {{ lang }} queries.
{% if schema %}
Graph schema:
{{ schema }}
{% endif %}
Question: {{ question }}

Answer with a single {{ lang }} query in a fenced code block.";

pub struct ChatGenerator {
    client: reqwest::blocking::Client,
    url: String,
    api_key: Option<String>,
    model: String,
    lang: String,
    template: String,
    timeout: Duration,
}

pub fn build(config: &Nl2GraphConfig, run: &RunConfig) -> Result<Arc<dyn Generator>> {
    let (name, provider) = config
        .llm
        .provider_for(&run.model)
        .ok_or_else(|| anyhow!("unknown model provider for '{}'", run.model))?;
    let template = load_template(config.llm.templates.as_deref(), &run.lang)?;
    debug!(provider = name, model = %run.model, "chat generator");
    Ok(Arc::new(ChatGenerator::new(provider, run, template)?))
}

/// `<templates>/<lang>.j2` when a template directory is configured.
fn load_template(dir: Option<&Path>, lang: &str) -> Result<String> {
    let Some(dir) = dir else {
        return Ok(DEFAULT_TEMPLATE.to_string());
    };
    let path = dir.join(format!("{lang}.j2"));
    std::fs::read_to_string(&path).with_context(|| format!("no prompt template {}", path.display()))
}

impl ChatGenerator {
    fn new(provider: &ProviderConfig, run: &RunConfig, template: String) -> Result<Self> {
        let timeout = Duration::from_secs(provider.effective_timeout_secs());
        Ok(Self {
            client: http_client(timeout)?,
            url: format!("{}/chat/completions", provider.base_url.trim_end_matches('/')),
            api_key: env_secret(provider.api_key_env.as_deref())?,
            model: run.model.clone(),
            lang: run.lang.clone(),
            template,
            timeout,
        })
    }

    fn render(&self, question: &str, schema: Option<&Schema>) -> Result<String, CollaboratorError> {
        Environment::new()
            .render_str(
                &self.template,
                context! {
                    question => question,
                    schema => schema.map(Schema::to_prompt_string),
                    lang => self.lang,
                },
            )
            .map_err(|e| CollaboratorError::Backend(format!("prompt template: {e}")))
    }
}

impl Generator for ChatGenerator {
    fn generate(
        &self,
        question: &str,
        schema: Option<&Schema>,
    ) -> Result<GenerationOutput, CollaboratorError> {
        let prompt = self.render(question, schema)?;
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0,
        });

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let started = Instant::now();
        let response = send_json(request, self.timeout)?;
        parse_completion(&response, started.elapsed())
    }
}

/// First choice's content plus duration and token usage.
fn parse_completion(response: &Value, elapsed: Duration) -> Result<GenerationOutput, CollaboratorError> {
    let content = response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| CollaboratorError::Backend("completion has no message content".into()))?;

    let usage = |pointer: &str| response.pointer(pointer).and_then(Value::as_u64).unwrap_or(0);
    let mut stats = Map::new();
    stats.insert("duration".into(), json!(elapsed.as_secs_f64()));
    stats.insert("input_tokens".into(), json!(usage("/usage/prompt_tokens")));
    stats.insert("output_tokens".into(), json!(usage("/usage/completion_tokens")));
    stats.insert(
        "cached_tokens".into(),
        json!(usage("/usage/prompt_tokens_details/cached_tokens")),
    );

    Ok(GenerationOutput {
        content: content.to_string(),
        stats: Some(stats),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(template: &str) -> ChatGenerator {
        let provider = ProviderConfig {
            base_url: "http://localhost:8000/v1/".into(),
            ..ProviderConfig::default()
        };
        let run = RunConfig::new(nl2graph_core::Method::Llm, "cypher", "gpt-4o");
        ChatGenerator::new(&provider, &run, template.to_string()).unwrap()
    }

    #[test]
    fn default_template_includes_schema_and_question() {
        let gen = generator(DEFAULT_TEMPLATE);
        assert_eq!(gen.url, "http://localhost:8000/v1/chat/completions");
        let schema = Schema::new("cypher", "  (:Movie)-[:DIRECTED_BY]->(:Person)\n");
        let prompt = gen.render("Who directed Heat?", Some(&schema)).unwrap();
        assert!(prompt.contains("(:Movie)-[:DIRECTED_BY]->(:Person)"));
        assert!(prompt.contains("Question: Who directed Heat?"));
        assert!(prompt.contains("cypher queries"));

        let bare = gen.render("q", None).unwrap();
        assert!(!bare.contains("Graph schema"));
    }

    #[test]
    fn completion_parsing_collects_usage() {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "```cypher\nMATCH (n) RETURN n\n```"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 14,
                      "prompt_tokens_details": {"cached_tokens": 64}}
        });
        let out = parse_completion(&response, Duration::from_millis(1500)).unwrap();
        assert!(out.content.starts_with("```cypher"));
        let stats = out.stats.unwrap();
        assert_eq!(stats["input_tokens"], json!(120));
        assert_eq!(stats["cached_tokens"], json!(64));
        assert_eq!(stats["duration"], json!(1.5));
    }

    #[test]
    fn empty_completion_is_an_error() {
        let err = parse_completion(&json!({"choices": []}), Duration::ZERO).unwrap_err();
        assert!(matches!(err, CollaboratorError::Backend(_)));
    }

    #[test]
    fn missing_template_file_is_reported() {
        let dir = std::env::temp_dir().join("nl2graph-no-templates");
        let err = load_template(Some(&dir), "sparql").unwrap_err();
        assert!(err.to_string().contains("sparql.j2"));
        assert_eq!(load_template(None, "sparql").unwrap(), DEFAULT_TEMPLATE);
    }
}
