//! Configuration data model.
//!
//! Every section deserializes with defaults so partial files are valid.
//! Unknown keys are rejected so typos surface as errors instead of being
//! silently ignored.

use serde::Deserialize;

use super::defaults::{DEFAULT_CONTINUATION_PROMPT, DEFAULT_PROMPT};
use crate::xeval::DEFAULT_REPLVAR;

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub log: LogConfig,
    pub repl: ReplConfig,
    pub display: DisplayConfig,
    pub xeval: XevalConfig,
}

/// Diagnostic logging.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or `deno_boot=debug`.
    pub filter: Option<String>,
}

/// Interactive loop presentation.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ReplConfig {
    pub prompt: String,
    pub continuation_prompt: String,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            continuation_prompt: DEFAULT_CONTINUATION_PROMPT.to_string(),
        }
    }
}

/// Terminal output styling.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Defaults for eval mode when the command line leaves them out.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct XevalConfig {
    /// Chunk separator; empty means newline.
    pub delimiter: String,
    /// Variable each chunk is bound to.
    pub replvar: String,
}

impl Default for XevalConfig {
    fn default() -> Self {
        Self {
            delimiter: String::new(),
            replvar: DEFAULT_REPLVAR.to_string(),
        }
    }
}
