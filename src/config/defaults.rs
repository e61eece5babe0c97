//! Default configuration constants.

/// Log filter used when neither flags, env, nor config choose one.
pub const DEFAULT_LOG_FILTER: &str = "warn";
/// Primary REPL prompt.
pub(super) const DEFAULT_PROMPT: &str = "> ";
/// Prompt shown while an entry is still incomplete.
pub(super) const DEFAULT_CONTINUATION_PROMPT: &str = "... ";
/// File name looked up in the working directory and the user config dir.
pub(super) const CONFIG_FILE_NAME: &str = "deno.toml";
/// Subdirectory of the user config dir holding `deno.toml`.
pub(super) const CONFIG_DIR_NAME: &str = "deno";
