//! Shared traits used across nl2graph crates.

pub mod collaborators;
pub mod storage;

pub use collaborators::{Executor, GenerationOutput, Generator, Row, Scorer};
pub use storage::{IResultStore, ISourceStore};
