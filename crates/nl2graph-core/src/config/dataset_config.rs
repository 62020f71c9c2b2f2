//! Per-dataset file locations and graph endpoints.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatasetConfig {
    /// JSON array of input records, loaded by `init`.
    pub data: Option<PathBuf>,
    /// Source record database.
    pub src: Option<PathBuf>,
    /// Result database. Required by every command that touches results;
    /// there is no shared default, so datasets never mix rows.
    pub dst: Option<PathBuf>,
    /// Schema text file per query language.
    pub schema: BTreeMap<String, PathBuf>,
    /// Record fields to break reports down by.
    pub group_by: Vec<String>,
    /// Graph endpoint per query language.
    pub endpoints: BTreeMap<String, EndpointConfig>,
}

/// A graph database reachable over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EndpointConfig {
    pub url: String,
    pub username: Option<String>,
    /// Environment variable holding the password.
    pub password_env: Option<String>,
    /// Neo4j database name. Default: "neo4j".
    pub database: Option<String>,
    /// Per-query timeout. Default: 30s.
    pub timeout_secs: Option<u64>,
}

impl EndpointConfig {
    pub fn effective_database(&self) -> &str {
        self.database.as_deref().unwrap_or("neo4j")
    }

    pub fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(30)
    }
}
