//! Tracing subscriber setup.
//!
//! `NL2GRAPH_LOG` takes precedence over `[log] level`. Output goes to stderr
//! so stdout stays free for command results.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::LogConfig;
use crate::constants::LOG_ENV_VAR;

/// Build the filter from the environment, falling back to the configured level.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(config.effective_level()))
}

/// Install the global subscriber. Returns false if one was already set.
pub fn init_tracing(config: &LogConfig) -> bool {
    let builder = FmtSubscriber::builder()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if config.effective_json() {
        ::tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        ::tracing::subscriber::set_global_default(builder.finish())
    };
    installed.is_ok()
}
