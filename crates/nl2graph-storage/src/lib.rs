//! # nl2graph-storage
//!
//! SQLite persistence for the nl2graph pipeline.
//! WAL mode, write-serialized + read-pooled, user_version migrations.
//! `ResultStorageEngine` owns the cascade rule; `SourceStorageEngine`
//! serves input records.

pub mod connection;
pub mod engine;
pub mod migrations;
pub mod queries;

pub use connection::DatabaseManager;
pub use engine::{ResultStorageEngine, SourceStorageEngine};
