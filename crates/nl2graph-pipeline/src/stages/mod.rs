//! Per-record work for each stage: one collaborator call, one store write.

pub mod evaluate;
pub mod execute;
pub mod generate;

use nl2graph_core::errors::PipelineError;
use nl2graph_core::traits::storage::IResultStore;
use nl2graph_core::{ResultKey, Stage};

use crate::pending::WorkItem;

pub use evaluate::EvaluateTask;
pub use execute::{flatten_rows, ExecuteTask};
pub use generate::GenerateTask;

/// How a processed record is counted in the stage report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    /// Persisted, but as a failure (execution error, or null evaluation).
    Failed,
}

/// The work one stage performs for a single pending record.
///
/// `process` must persist its result through the matching `save_*` before
/// returning. Returning `Err` aborts the whole stage run.
pub trait StageTask: Send + Sync {
    fn stage(&self) -> Stage;

    fn process(
        &self,
        item: &WorkItem,
        key: &ResultKey,
        store: &dyn IResultStore,
    ) -> Result<Outcome, PipelineError>;
}
