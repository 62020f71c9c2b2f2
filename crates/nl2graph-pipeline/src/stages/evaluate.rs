//! Evaluate: execution result vs gold answers. A failed execution scores as
//! all-null rather than zero.

use std::sync::Arc;

use nl2graph_core::errors::PipelineError;
use nl2graph_core::traits::storage::IResultStore;
use nl2graph_core::traits::Scorer;
use nl2graph_core::{EvaluationResult, ResultKey, Stage};

use super::{Outcome, StageTask};
use crate::pending::WorkItem;

pub struct EvaluateTask {
    scorer: Arc<dyn Scorer>,
}

impl EvaluateTask {
    pub fn new(scorer: Arc<dyn Scorer>) -> Self {
        Self { scorer }
    }

    fn score(&self, item: &WorkItem) -> EvaluationResult {
        match item.row.as_ref().and_then(|r| r.exec.as_ref()) {
            Some(exec) if exec.success => {
                let predicted = exec.result.as_deref().unwrap_or_default();
                self.scorer.score(&item.record.answer, predicted).into()
            }
            _ => EvaluationResult::default(),
        }
    }
}

impl StageTask for EvaluateTask {
    fn stage(&self) -> Stage {
        Stage::Eval
    }

    fn process(
        &self,
        item: &WorkItem,
        key: &ResultKey,
        store: &dyn IResultStore,
    ) -> Result<Outcome, PipelineError> {
        let eval = self.score(item);
        store.save_evaluation(key, &eval)?;
        Ok(if eval.is_null() {
            Outcome::Failed
        } else {
            Outcome::Succeeded
        })
    }
}
