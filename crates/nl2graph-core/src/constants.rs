//! Defaults and well-known strings shared across crates.

/// Worker count when neither config nor CLI sets one. Sequential.
pub const DEFAULT_WORKERS: usize = 1;

pub const DEFAULT_READ_POOL_SIZE: usize = 4;

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_SEQ2SEQ_TIMEOUT_SECS: u64 = 60;

/// Environment variable read by `init_tracing` for the filter directive.
pub const LOG_ENV_VAR: &str = "NL2GRAPH_LOG";

/// Execution error stored when generation produced no query.
pub const NO_QUERY_ERROR: &str = "no query to execute";
