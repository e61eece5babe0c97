//! Environment overrides applied after the config file is parsed.

use super::Config;

/// Log filter directive.
pub const ENV_LOG: &str = "DENO_LOG";
/// Any non-empty value disables color (<https://no-color.org>).
pub const ENV_NO_COLOR: &str = "NO_COLOR";
/// Default eval-mode delimiter.
pub const ENV_XEVAL_DELIM: &str = "DENO_XEVAL_DELIM";

pub(super) fn apply_env_overrides<FEnv>(config: &mut Config, env_lookup: &FEnv)
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(filter) = non_empty(env_lookup(ENV_LOG)) {
        config.log.filter = Some(filter);
    }
    if non_empty(env_lookup(ENV_NO_COLOR)).is_some() {
        config.display.color = false;
    }
    // An empty delimiter is meaningful (newline), so presence alone counts.
    if let Some(delim) = env_lookup(ENV_XEVAL_DELIM) {
        config.xeval.delimiter = delim;
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
