//! End-to-end startup flows through the public library API.
//!
//! Each test parses a command line, builds startup info through the host,
//! dispatches, and drives the real eval/REPL/loader entry points against
//! in-memory streams.

use clap::Parser;
use deno_boot::cli::Cli;
use deno_boot::config::Config;
use deno_boot::dispatch::{dispatch, Dispatched, Entrypoints, StartOptions};
use deno_boot::error::DispatchError;
use deno_boot::host;
use deno_boot::loader::{FsModuleLoader, ModuleLoader};
use deno_boot::repl::{repl_loop, ReplOptions};
use deno_boot::state::{ProcessState, TYPESCRIPT_VERSION};
use deno_boot::xeval::{xeval_main, EvalHook};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Entry points reading from a fixed stdin buffer and capturing output.
struct Captured {
    stdin: Vec<u8>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    invoked: Vec<&'static str>,
}

impl Captured {
    fn new(stdin: &str) -> Self {
        Self {
            stdin: stdin.as_bytes().to_vec(),
            stdout: Vec::new(),
            stderr: Vec::new(),
            invoked: Vec::new(),
        }
    }

    fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

impl Entrypoints for Captured {
    fn xeval_main(&mut self, hook: &EvalHook, delim: &str, state: Arc<ProcessState>) -> i32 {
        self.invoked.push("xeval");
        match xeval_main(hook, delim, self.stdin.as_slice(), &mut self.stdout, &state) {
            Ok(_) => 0,
            Err(e) => {
                self.stderr.extend_from_slice(e.to_string().as_bytes());
                1
            }
        }
    }

    fn repl_loop(&mut self, state: Arc<ProcessState>) -> i32 {
        self.invoked.push("repl");
        repl_loop(
            self.stdin.as_slice(),
            &mut self.stdout,
            &mut self.stderr,
            &state,
            &ReplOptions::default(),
        )
        .expect("in-memory repl io")
    }
}

fn start(
    args: &[&str],
    cwd: &Path,
    captured: &mut Captured,
) -> Result<Dispatched, DispatchError> {
    let cli = Cli::parse_from(args);
    let info = host::start(&cli, "deno", cwd.to_path_buf(), &Config::default()).expect("host");
    let options = StartOptions {
        preserve_namespace: true,
        name: None,
    };
    let mut stdout = Vec::new();
    let outcome = dispatch(info, options, captured, &mut stdout);
    captured.stdout.extend_from_slice(&stdout);
    outcome
}

fn temp_dir(label: &str) -> PathBuf {
    let n = DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "deno-boot-it-{label}-{}-{n}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn version_flag_reports_and_exits() {
    let mut captured = Captured::new("");
    let outcome = start(&["deno", "-v", "main.js"], Path::new("/"), &mut captured);
    assert_eq!(outcome, Ok(Dispatched::Exit(0)));
    let stdout = captured.stdout();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("deno: "));
    assert!(lines[1].starts_with("v8: "));
    assert_eq!(lines[2], format!("typescript: {TYPESCRIPT_VERSION}"));
    assert!(captured.invoked.is_empty());
}

#[test]
fn bare_invocation_runs_the_repl() {
    let mut captured = Captured::new("1 + 2\nexit\n");
    let outcome = start(&["deno"], Path::new("/"), &mut captured);
    assert_eq!(outcome, Ok(Dispatched::Completed(0)));
    assert_eq!(captured.invoked, ["repl"]);
    assert_eq!(captured.stdout(), "> 3\n> ");
}

#[test]
fn xeval_processes_each_chunk() {
    let mut captured = Captured::new("alpha,beta,,gamma");
    let outcome = start(
        &["deno", "xeval", "-d", ",", "print(len($))"],
        Path::new("/"),
        &mut captured,
    );
    assert_eq!(outcome, Ok(Dispatched::Completed(0)));
    assert_eq!(captured.invoked, ["xeval"]);
    assert_eq!(captured.stdout(), "5\n4\n5\n");
}

#[test]
fn xeval_script_error_exits_one() {
    let mut captured = Captured::new("a\n");
    let outcome = start(&["deno", "xeval", "nope($)"], Path::new("/"), &mut captured);
    assert_eq!(outcome, Ok(Dispatched::Completed(1)));
    let stderr = String::from_utf8_lossy(&captured.stderr).into_owned();
    assert!(stderr.contains("ReferenceError"), "got: {stderr}");
}

#[test]
fn script_hands_off_to_loader_with_frozen_args() {
    let dir = temp_dir("module");
    fs::write(
        dir.join("main.js"),
        "print(Deno.args)\nprint(Deno.location)\n",
    )
    .expect("write module");

    let mut captured = Captured::new("");
    let outcome = start(&["deno", "run", "main.js", "one", "two"], &dir, &mut captured);
    let Ok(Dispatched::ModuleExecution(state)) = outcome else {
        panic!("expected module execution, got {outcome:?}");
    };
    assert!(captured.invoked.is_empty());
    assert_eq!(state.args.as_slice(), ["main.js", "one", "two"]);
    let mut frozen = state.args.clone();
    assert!(frozen.push("three").is_err());

    let mut out = Vec::new();
    FsModuleLoader
        .run_main_module(&state, &mut out)
        .expect("module runs");
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "main.js,one,two\nmain.js\n"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn empty_script_name_is_fatal() {
    let mut captured = Captured::new("");
    let outcome = start(&["deno", ""], Path::new("/"), &mut captured);
    assert_eq!(outcome, Err(DispatchError::EmptyMainModule));
    assert!(captured.invoked.is_empty());
    assert!(captured.stdout.is_empty());
}
