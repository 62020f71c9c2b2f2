//! # nl2graph-pipeline
//!
//! The three experiment stages (generate, execute, evaluate), the worker
//! pool that dispatches them, and the scoring and reporting built on their
//! results. Storage and collaborators are reached only through the traits
//! in `nl2graph-core`.

pub mod extract;
pub mod orchestrator;
pub mod pending;
pub mod pool;
pub mod report;
pub mod runner;
pub mod scoring;
pub mod stages;

pub mod testing;

pub use orchestrator::{Collaborators, Orchestrator, PipelineSettings, RunSummary};
pub use pending::{PendingPolicy, PendingSet, WorkItem};
pub use pool::WorkerPool;
pub use report::{ErrorAnalysis, GroupStats, Report, Reporting};
pub use runner::{ProgressEvent, ProgressFn, StageReport, StageRunner};
pub use scoring::SetScorer;
