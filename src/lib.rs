//! Runtime bootstrap: resolve process startup into exactly one execution mode.
//!
//! Host initialization turns command-line input into a
//! [`StartupInfo`](dispatch::StartupInfo). [`dispatch::dispatch`] records
//! versions, installs the stack-trace formatter, publishes the script
//! location and frozen arguments, and hands the resulting
//! [`ProcessState`](state::ProcessState) to one entry point: the version
//! report, eval mode, the REPL, or the module loader.
//!
//! # Quick start
//!
//! ```no_run
//! use deno_boot::dispatch::{dispatch, Dispatched, Entrypoints, StartOptions, StartupInfo};
//! use deno_boot::state::ProcessState;
//! use deno_boot::xeval::EvalHook;
//! use std::sync::Arc;
//!
//! struct Noop;
//!
//! impl Entrypoints for Noop {
//!     fn xeval_main(&mut self, _: &EvalHook, _: &str, _: Arc<ProcessState>) -> i32 {
//!         0
//!     }
//!     fn repl_loop(&mut self, _: Arc<ProcessState>) -> i32 {
//!         0
//!     }
//! }
//!
//! let info = StartupInfo {
//!     deno_version: "0.9.0".into(),
//!     v8_version: "0.3.0".into(),
//!     version_flag: true,
//!     main_module: None,
//!     cwd: std::env::current_dir().unwrap(),
//!     argv: vec!["deno".into()],
//!     xeval_delim: String::new(),
//!     eval: None,
//! };
//! let outcome = dispatch(info, StartOptions::default(), &mut Noop, &mut std::io::stdout());
//! assert_eq!(outcome.unwrap(), Dispatched::Exit(0));
//! ```

pub mod build_info;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod error_stack;
pub mod host;
pub mod loader;
pub mod logging;
pub mod render;
pub mod repl;
pub mod state;
#[cfg(test)]
pub mod testsupport;
pub mod xeval;
