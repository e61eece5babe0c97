//! CLI argument parsing via clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::build_info::HELP_BUILD_METADATA;

/// Levels accepted by `--log-level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A small script runtime. Runs a module, evaluates stdin chunks, or starts a REPL.
#[derive(Debug, Parser)]
#[command(
    name = "deno",
    disable_version_flag = true,
    disable_help_subcommand = true,
    args_conflicts_with_subcommands = true,
    after_help = HELP_BUILD_METADATA
)]
pub struct Cli {
    /// Print runtime, engine, and TypeScript versions, then exit.
    #[arg(short = 'v', long = "version", global = true)]
    pub version: bool,

    /// Log debug output (same as `--log-level debug`).
    #[arg(short = 'D', long = "log-debug", global = true)]
    pub log_debug: bool,

    /// Set the diagnostic log level.
    #[arg(
        short = 'L',
        long = "log-level",
        value_name = "LEVEL",
        value_parser = LOG_LEVELS,
        global = true
    )]
    pub log_level: Option<String>,

    /// Path to config file (default: ./deno.toml or <config dir>/deno/deno.toml).
    #[arg(short = 'c', long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable color output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Script to run. Without one, the REPL starts.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<String>,

    /// Arguments passed to the script.
    #[arg(
        value_name = "ARGS",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<String>,
}

/// Explicit subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run a script.
    Run {
        #[arg(value_name = "SCRIPT")]
        script: String,
        #[arg(
            value_name = "ARGS",
            num_args = 0..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        args: Vec<String>,
    },
    /// Start the interactive REPL.
    Repl,
    /// Evaluate CODE once per chunk of stdin.
    Xeval {
        /// Chunk delimiter (default: newline).
        #[arg(short = 'd', long = "delim", value_name = "DELIM")]
        delim: Option<String>,
        /// Variable each chunk is bound to (default: `$`).
        #[arg(short = 'I', long = "replvar", value_name = "NAME")]
        replvar: Option<String>,
        #[arg(value_name = "CODE")]
        code: String,
    },
}
