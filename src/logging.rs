//! Diagnostic logging through `tracing`.
//!
//! Logs go to stderr so they never interleave with script output on stdout.
//! The subscriber is installed at most once per process.

use std::io::{self, IsTerminal};
use std::sync::OnceLock;

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, DEFAULT_LOG_FILTER};
use crate::error::LogError;

static LOG_GUARD: OnceLock<String> = OnceLock::new();

/// Pick the filter directive: `-D`, then `-L`, then env/config, then `warn`.
///
/// `DENO_LOG` has already been folded into `config.log.filter` by the loader.
pub fn resolve_filter(log_debug: bool, log_level: Option<&str>, config: &Config) -> String {
    if log_debug {
        return "debug".to_string();
    }
    log_level
        .or(config.log.filter.as_deref())
        .unwrap_or(DEFAULT_LOG_FILTER)
        .to_string()
}

/// Install the global subscriber with `filter`.
///
/// Later calls are no-ops and keep the first filter.
pub fn init(filter: &str, color: bool) -> Result<(), LogError> {
    let env_filter = EnvFilter::try_new(filter).map_err(|e| LogError::Filter(e.to_string()))?;
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(color && io::stderr().is_terminal())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LogError::Subscriber(e.to_string()))?;
    let _ = LOG_GUARD.set(filter.to_string());
    Ok(())
}

/// Filter installed by [`init`], if any.
pub fn active_filter() -> Option<&'static str> {
    LOG_GUARD.get().map(String::as_str)
}
