//! Generate: question (+ schema) → candidate query.

use std::sync::Arc;

use nl2graph_core::errors::PipelineError;
use nl2graph_core::traits::storage::IResultStore;
use nl2graph_core::traits::Generator;
use nl2graph_core::{GenerationResult, ResultKey, Schema, Stage};

use super::{Outcome, StageTask};
use crate::extract::extract_query;
use crate::pending::WorkItem;

pub struct GenerateTask {
    generator: Arc<dyn Generator>,
    schema: Option<Schema>,
    extract: bool,
}

impl GenerateTask {
    pub fn new(generator: Arc<dyn Generator>, schema: Option<Schema>, extract: bool) -> Self {
        Self {
            generator,
            schema,
            extract,
        }
    }
}

impl StageTask for GenerateTask {
    fn stage(&self) -> Stage {
        Stage::Gen
    }

    fn process(
        &self,
        item: &WorkItem,
        key: &ResultKey,
        store: &dyn IResultStore,
    ) -> Result<Outcome, PipelineError> {
        let output = self
            .generator
            .generate(&item.record.question, self.schema.as_ref())
            .map_err(|e| PipelineError::Generation {
                record_id: item.record.id.clone(),
                message: e.to_string(),
            })?;

        let query = if self.extract {
            extract_query(&output.content)
        } else {
            output.content.clone()
        };
        let gen = GenerationResult {
            query: (!query.trim().is_empty()).then_some(query),
            query_raw: Some(output.content),
            stats: output.stats,
        };
        store.save_generation(key, &gen)?;
        Ok(Outcome::Succeeded)
    }
}
