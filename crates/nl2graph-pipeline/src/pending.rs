//! Pending-set computation: which records a stage should process.
//!
//! Runs as a pre-pass over the store before any work is dispatched, so two
//! stages of the same record are never in flight together.

use nl2graph_core::errors::StorageError;
use nl2graph_core::traits::storage::IResultStore;
use nl2graph_core::{IfExists, Record, ResultRow, RunConfig, Stage};

/// Policy knobs for pending-set computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingPolicy {
    pub if_exists: IfExists,
    /// Under skip, keep records whose execution failed pending for
    /// evaluation even if they already carry an (all-null) evaluation.
    pub reevaluate_failed: bool,
}

/// A record selected for processing together with its stored row at the
/// time of the pre-pass.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub record: Record,
    pub row: Option<ResultRow>,
}

#[derive(Debug, Default)]
pub struct PendingSet {
    pub pending: Vec<WorkItem>,
    /// Excluded because the stage already has a value (skip policy only).
    pub skipped_existing: usize,
    /// Excluded because the previous stage has no value.
    pub missing_prerequisite: usize,
}

fn has_stage(row: Option<&ResultRow>, stage: Stage) -> bool {
    row.is_some_and(|r| match stage {
        Stage::Gen => r.gen.is_some(),
        Stage::Exec => r.exec.is_some(),
        Stage::Eval => r.eval.is_some(),
    })
}

fn execution_failed(row: Option<&ResultRow>) -> bool {
    row.and_then(|r| r.exec.as_ref()).is_some_and(|e| !e.success)
}

/// Split `records` into pending, already-done and not-yet-eligible.
pub fn compute(
    stage: Stage,
    records: &[Record],
    store: &dyn IResultStore,
    run: &RunConfig,
    policy: PendingPolicy,
) -> Result<PendingSet, StorageError> {
    let mut set = PendingSet::default();
    for record in records {
        let row = store.get(&run.key_for(&record.id))?;

        if let Some(prereq) = stage.prerequisite() {
            if !has_stage(row.as_ref(), prereq) {
                set.missing_prerequisite += 1;
                continue;
            }
        }

        if policy.if_exists == IfExists::Skip && has_stage(row.as_ref(), stage) {
            let retry = stage == Stage::Eval
                && policy.reevaluate_failed
                && execution_failed(row.as_ref());
            if !retry {
                set.skipped_existing += 1;
                continue;
            }
        }

        set.pending.push(WorkItem {
            record: record.clone(),
            row,
        });
    }
    Ok(set)
}
