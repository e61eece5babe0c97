//! Identity of this build: the runtime version plus the stamps from `build.rs`.

/// Runtime version; the `deno:` line of the version report.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const GIT_COMMIT: &str = env!("DENO_BUILD_GIT_HASH");
pub const BUILD_TIMESTAMP: &str = env!("DENO_BUILD_TIMESTAMP");

/// Appended to `deno --help` so bug reports can name the exact build.
pub const HELP_BUILD_METADATA: &str = concat!(
    "Build metadata:\n  commit: ",
    env!("DENO_BUILD_GIT_HASH"),
    "\n  built: ",
    env!("DENO_BUILD_TIMESTAMP")
);

/// Logged at debug level before dispatch starts.
pub fn build_metadata_line() -> String {
    format!("deno {VERSION} (commit {GIT_COMMIT}, built {BUILD_TIMESTAMP})")
}
