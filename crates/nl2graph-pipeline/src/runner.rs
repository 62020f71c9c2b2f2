//! `StageRunner`: pending-set pre-pass, dispatch and bookkeeping for one
//! stage invocation.

use std::sync::Arc;

use nl2graph_core::errors::PipelineError;
use nl2graph_core::traits::storage::IResultStore;
use nl2graph_core::{IfExists, Record, RunConfig, Stage};
use serde::Serialize;
use tracing::{info, warn};

use crate::pending::{self, PendingPolicy, WorkItem};
use crate::pool::WorkerPool;
use crate::stages::{Outcome, StageTask};

/// Emitted on the calling thread once after the pending pre-pass
/// (`done == 0`) and then after each record is persisted. The pre-pass
/// counts ride along on every event, so a caller still has them when the
/// run aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub done: usize,
    /// Records pending this run.
    pub total: usize,
    pub skipped_existing: usize,
    pub missing_prerequisite: usize,
}

impl ProgressEvent {
    pub fn is_planned(&self) -> bool {
        self.done == 0
    }
}

pub type ProgressFn = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Counts for one stage invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    /// Records handed to the stage.
    pub total: usize,
    pub skipped_existing: usize,
    pub missing_prerequisite: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl StageReport {
    fn new(stage: Stage, total: usize) -> Self {
        Self {
            stage,
            total,
            skipped_existing: 0,
            missing_prerequisite: 0,
            processed: 0,
            succeeded: 0,
            failed: 0,
        }
    }

    /// Records not processed this run, for any reason.
    pub fn skipped(&self) -> usize {
        self.skipped_existing + self.missing_prerequisite
    }
}

pub struct StageRunner<'a> {
    store: &'a dyn IResultStore,
    run: &'a RunConfig,
    pool: WorkerPool,
    policy: PendingPolicy,
    progress: Option<ProgressFn>,
}

impl<'a> StageRunner<'a> {
    pub fn new(
        store: &'a dyn IResultStore,
        run: &'a RunConfig,
        workers: usize,
        if_exists: IfExists,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            store,
            run,
            pool: WorkerPool::new(workers)?,
            policy: PendingPolicy {
                if_exists,
                reevaluate_failed: false,
            },
            progress: None,
        })
    }

    pub fn reevaluate_failed(mut self, enabled: bool) -> Self {
        self.policy.reevaluate_failed = enabled;
        self
    }

    pub fn with_progress(mut self, progress: Option<ProgressFn>) -> Self {
        self.progress = progress;
        self
    }

    /// Compute the pending set for `task`'s stage over `records` and process
    /// it. Each record is persisted as soon as it is done, so an aborted run
    /// keeps everything finished before the failure.
    pub fn run(&self, task: &dyn StageTask, records: &[Record]) -> Result<StageReport, PipelineError> {
        let stage = task.stage();
        let set = pending::compute(stage, records, self.store, self.run, self.policy)?;

        let mut report = StageReport::new(stage, records.len());
        report.skipped_existing = set.skipped_existing;
        report.missing_prerequisite = set.missing_prerequisite;
        let pending_count = set.pending.len();

        info!(
            stage = %stage,
            run = %self.run,
            total = records.len(),
            pending = pending_count,
            skipped_existing = set.skipped_existing,
            missing_prerequisite = set.missing_prerequisite,
            workers = self.pool.workers(),
            if_exists = %self.policy.if_exists,
            "{} records",
            stage.label()
        );
        let (skipped_existing, missing_prerequisite) =
            (set.skipped_existing, set.missing_prerequisite);
        let event = move |done: usize| ProgressEvent {
            stage,
            done,
            total: pending_count,
            skipped_existing,
            missing_prerequisite,
        };
        if let Some(progress) = &self.progress {
            progress(event(0));
        }
        if pending_count == 0 {
            return Ok(report);
        }

        let store = self.store;
        let run = self.run;
        let work = |item: WorkItem| {
            let key = run.key_for(&item.record.id);
            task.process(&item, &key, store)
        };

        let mut done = 0;
        let on_done = |_: &Outcome| {
            done += 1;
            if let Some(progress) = &self.progress {
                progress(event(done));
            }
        };

        let outcomes = match self.pool.run(set.pending, work, on_done) {
            Ok(outcomes) => outcomes,
            Err(e) => {
                warn!(stage = %stage, run = %self.run, error = %e, "stage aborted");
                return Err(e);
            }
        };

        report.processed = outcomes.len();
        report.succeeded = outcomes.iter().filter(|o| **o == Outcome::Succeeded).count();
        report.failed = report.processed - report.succeeded;

        info!(
            stage = %stage,
            run = %self.run,
            processed = report.processed,
            succeeded = report.succeeded,
            failed = report.failed,
            "stage complete"
        );
        Ok(report)
    }
}
