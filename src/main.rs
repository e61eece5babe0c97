//! CLI entry point for the runtime.

use clap::Parser;
use deno_boot::build_info;
use deno_boot::cli::Cli;
use deno_boot::config::{load_config, Config};
use deno_boot::dispatch::{dispatch, Dispatched, Entrypoints, StartOptions};
use deno_boot::error::{EvalError, HostError, LoadError};
use deno_boot::error_stack::format_error;
use deno_boot::host;
use deno_boot::loader::{FsModuleLoader, ModuleLoader};
use deno_boot::logging;
use deno_boot::render::Renderer;
use deno_boot::repl::{repl_loop, ReplOptions};
use deno_boot::state::ProcessState;
use deno_boot::xeval::{xeval_main, EvalHook};
use std::io::{self, IsTerminal};
use std::sync::Arc;
use tracing::debug;

/// Fallback program name when the OS hands us an empty argv.
const PROGRAM_NAME: &str = "deno";

fn main() {
    // clap exits with status 2 on usage errors.
    let cli = Cli::parse();
    std::process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let mut config = match load_config(cli.config.as_deref()) {
        Ok(loaded) => loaded.config,
        // The version report never depends on configuration.
        Err(e) if cli.version => {
            stderr_renderer(!cli.no_color).warn(&HostError::from(e).to_string());
            Config::default()
        }
        Err(e) => {
            stderr_renderer(!cli.no_color).error(&HostError::from(e).to_string());
            return 1;
        }
    };
    if cli.no_color {
        config.display.color = false;
    }
    let renderer = stderr_renderer(config.display.color);

    let filter = logging::resolve_filter(cli.log_debug, cli.log_level.as_deref(), &config);
    if let Err(e) = logging::init(&filter, config.display.color) {
        renderer.warn(&e.to_string());
    }
    debug!(build = %build_info::build_metadata_line(), filter = %filter, "starting");

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            renderer.error(&HostError::Cwd(e).to_string());
            return 1;
        }
    };
    let program = std::env::args()
        .next()
        .unwrap_or_else(|| PROGRAM_NAME.to_string());
    let info = match host::start(cli, &program, cwd, &config) {
        Ok(info) => info,
        Err(e) => {
            renderer.error(&e.to_string());
            return 1;
        }
    };

    let mut entrypoints = StdEntrypoints {
        renderer,
        repl: ReplOptions {
            prompt: config.repl.prompt.clone(),
            continuation_prompt: config.repl.continuation_prompt.clone(),
            color: config.display.color && io::stdout().is_terminal(),
        },
    };
    let options = StartOptions {
        preserve_namespace: true,
        name: None,
    };

    match dispatch(info, options, &mut entrypoints, &mut io::stdout()) {
        Ok(Dispatched::Exit(code)) | Ok(Dispatched::Completed(code)) => code,
        Ok(Dispatched::ModuleExecution(state)) => {
            run_main_module(&FsModuleLoader, &state, renderer)
        }
        Err(e) => {
            renderer.error(&e.to_string());
            1
        }
    }
}

/// Diagnostics are colored only when requested and stderr is a terminal.
fn stderr_renderer(color: bool) -> Renderer {
    Renderer::new(color && io::stderr().is_terminal())
}

fn run_main_module(loader: &dyn ModuleLoader, state: &ProcessState, renderer: Renderer) -> i32 {
    match loader.run_main_module(state, &mut io::stdout().lock()) {
        Ok(()) => 0,
        Err(LoadError::Script(report)) => {
            renderer.error(&format_error(&report));
            1
        }
        Err(e) => {
            renderer.error(&e.to_string());
            1
        }
    }
}

/// Entry points bound to the process's standard streams.
struct StdEntrypoints {
    renderer: Renderer,
    repl: ReplOptions,
}

impl Entrypoints for StdEntrypoints {
    fn xeval_main(&mut self, hook: &EvalHook, delim: &str, state: Arc<ProcessState>) -> i32 {
        let stdin = io::stdin().lock();
        match xeval_main(hook, delim, stdin, &mut io::stdout().lock(), &state) {
            Ok(chunks) => {
                debug!(chunks, "xeval finished");
                0
            }
            Err(EvalError::Script(report)) => {
                self.renderer.error(&format_error(&report));
                1
            }
            Err(e) => {
                self.renderer.error(&e.to_string());
                1
            }
        }
    }

    fn repl_loop(&mut self, state: Arc<ProcessState>) -> i32 {
        let result = repl_loop(
            io::stdin().lock(),
            &mut io::stdout().lock(),
            &mut io::stderr().lock(),
            &state,
            &self.repl,
        );
        result.unwrap_or_else(|e| {
            self.renderer.error(&format!("repl: {e}"));
            1
        })
    }
}
