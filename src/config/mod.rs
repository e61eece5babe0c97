//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`DENO_LOG`, `NO_COLOR`, `DENO_XEVAL_DELIM`)
//! 2. TOML file specified via --config CLI flag
//! 3. ./deno.toml in the current directory
//! 4. $XDG_CONFIG_HOME/deno/deno.toml (or the platform config dir)
//! 5. Built-in defaults
//!
//! Command-line flags sit above all of these and are applied by the host.

use crate::error::ConfigError;
use crate::xeval::is_valid_replvar;
use std::path::{Path, PathBuf};

mod defaults;
mod env;
mod sources;
mod types;

pub use defaults::DEFAULT_LOG_FILTER;
pub use env::{ENV_LOG, ENV_NO_COLOR, ENV_XEVAL_DELIM};
pub use sources::ConfigSource;
pub use types::{Config, DisplayConfig, LogConfig, ReplConfig, XevalConfig};

use env::apply_env_overrides;
use sources::{config_root_dir, read_config_text_with_sources};

/// Parsed configuration plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from --config flag).
pub fn load_config(path_override: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&Path>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (text, source) = read_config_text_with_sources(path_override, &read_file, &config_root)?;
    let mut config: Config = toml::from_str(&text)?;
    apply_env_overrides(&mut config, &env_lookup);
    validate(&config)?;
    Ok(LoadedConfig { config, source })
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if !is_valid_replvar(&config.xeval.replvar) {
        return Err(ConfigError::Invalid(format!(
            "xeval.replvar `{}` is not a valid identifier",
            config.xeval.replvar
        )));
    }
    if config.log.filter.as_deref().is_some_and(|f| f.trim().is_empty()) {
        return Err(ConfigError::Invalid(
            "log.filter must not be empty".to_string(),
        ));
    }
    if config.repl.prompt.is_empty() {
        return Err(ConfigError::Invalid(
            "repl.prompt must not be empty".to_string(),
        ));
    }
    Ok(())
}
