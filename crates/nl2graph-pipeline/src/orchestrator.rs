//! `Orchestrator`: the generate → execute → evaluate entry points for one
//! run configuration.
//!
//! Collaborators are injected at construction. Each entry point builds a
//! fresh `StageRunner`, so stages may be invoked in any order and any
//! number of times; regenerating after execution cascades through the store.

use std::sync::Arc;

use nl2graph_core::config::PipelineConfig;
use nl2graph_core::errors::PipelineError;
use nl2graph_core::traits::storage::IResultStore;
use nl2graph_core::traits::{Executor, Generator, Scorer};
use nl2graph_core::{IfExists, Record, RunConfig, Schema};
use serde::Serialize;

use crate::pool::WorkerPool;
use crate::runner::{ProgressFn, StageReport, StageRunner};
use crate::scoring::SetScorer;
use crate::stages::{EvaluateTask, ExecuteTask, GenerateTask, StageTask};

/// Run-wide knobs, usually derived from `[pipeline]` plus CLI overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub workers: usize,
    pub if_exists: IfExists,
    pub reevaluate_failed: bool,
    pub extract_query: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl PipelineSettings {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            workers: config.effective_workers(),
            if_exists: config.effective_if_exists(),
            reevaluate_failed: config.effective_reevaluate_failed(),
            extract_query: config.effective_extract_query(),
        }
    }
}

/// The external capabilities available to this run. Stages whose
/// collaborator is missing fail with `MissingCollaborator`.
#[derive(Clone)]
pub struct Collaborators {
    pub generator: Option<Arc<dyn Generator>>,
    pub executor: Option<Arc<dyn Executor>>,
    pub scorer: Arc<dyn Scorer>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            generator: None,
            executor: None,
            scorer: Arc::new(SetScorer),
        }
    }
}

impl Collaborators {
    pub fn with_generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = scorer;
        self
    }
}

/// Reports from `run_all`, one per stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub generate: StageReport,
    pub execute: StageReport,
    pub evaluate: StageReport,
}

pub struct Orchestrator {
    store: Arc<dyn IResultStore>,
    run: RunConfig,
    settings: PipelineSettings,
    collaborators: Collaborators,
    schema: Option<Schema>,
    progress: Option<ProgressFn>,
}

impl Orchestrator {
    /// Fails fast on invalid settings so no stage starts with a bad setup.
    pub fn new(
        store: Arc<dyn IResultStore>,
        run: RunConfig,
        settings: &PipelineSettings,
        collaborators: Collaborators,
    ) -> Result<Self, PipelineError> {
        WorkerPool::new(settings.workers)?;
        Ok(Self {
            store,
            run,
            settings: settings.clone(),
            collaborators,
            schema: None,
            progress: None,
        })
    }

    /// Schema passed to the generator with every question.
    pub fn with_schema(mut self, schema: Option<Schema>) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    fn runner(&self) -> Result<StageRunner<'_>, PipelineError> {
        Ok(StageRunner::new(
            &*self.store,
            &self.run,
            self.settings.workers,
            self.settings.if_exists,
        )?
        .reevaluate_failed(self.settings.reevaluate_failed)
        .with_progress(self.progress.clone()))
    }

    fn run_task(&self, task: &dyn StageTask, records: &[Record]) -> Result<StageReport, PipelineError> {
        self.runner()?.run(task, records)
    }

    pub fn generate(&self, records: &[Record]) -> Result<StageReport, PipelineError> {
        let generator = self
            .collaborators
            .generator
            .clone()
            .ok_or(PipelineError::MissingCollaborator { role: "generator" })?;
        let task = GenerateTask::new(generator, self.schema.clone(), self.settings.extract_query);
        self.run_task(&task, records)
    }

    pub fn execute(&self, records: &[Record]) -> Result<StageReport, PipelineError> {
        let executor = self
            .collaborators
            .executor
            .clone()
            .ok_or(PipelineError::MissingCollaborator { role: "executor" })?;
        self.run_task(&ExecuteTask::new(executor), records)
    }

    pub fn evaluate(&self, records: &[Record]) -> Result<StageReport, PipelineError> {
        let task = EvaluateTask::new(Arc::clone(&self.collaborators.scorer));
        self.run_task(&task, records)
    }

    /// All three stages in order over the same records.
    pub fn run_all(&self, records: &[Record]) -> Result<RunSummary, PipelineError> {
        // Check collaborators before generating anything.
        if self.collaborators.executor.is_none() {
            return Err(PipelineError::MissingCollaborator { role: "executor" });
        }
        Ok(RunSummary {
            generate: self.generate(records)?,
            execute: self.execute(records)?,
            evaluate: self.evaluate(records)?,
        })
    }
}
