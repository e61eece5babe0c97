//! Exit codes and stream output of the `deno` binary.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

const ANSI_ESCAPE: &str = "\u{1b}[";

fn deno(args: &[&str], stdin: &str) -> Output {
    deno_in(&std::env::temp_dir(), args, stdin)
}

fn deno_in(cwd: &Path, args: &[&str], stdin: &str) -> Output {
    let isolated_config = std::env::temp_dir().join("deno-boot-cli-binary-no-config");
    let mut child = Command::new(env!("CARGO_BIN_EXE_deno"))
        .args(args)
        .current_dir(cwd)
        .env("NO_COLOR", "1")
        .env("XDG_CONFIG_HOME", &isolated_config)
        .env_remove("DENO_LOG")
        .env_remove("DENO_XEVAL_DELIM")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn deno");
    // The child may exit before reading stdin; a broken pipe is fine.
    if let Some(mut pipe) = child.stdin.take() {
        let _ = pipe.write_all(stdin.as_bytes());
    }
    child.wait_with_output().expect("wait deno")
}

/// A fresh working directory holding a `deno.toml` with an unknown key.
fn dir_with_broken_config(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "deno-boot-cli-{label}-{}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    fs::write(dir.join("deno.toml"), "bogus = 1\n").expect("write deno.toml");
    dir
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn version_flag_prints_three_lines() {
    let output = deno(&["--version"], "");
    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    let labels: Vec<&str> = text
        .lines()
        .filter_map(|line| line.split(": ").next())
        .collect();
    assert_eq!(labels, ["deno", "v8", "typescript"]);
}

#[test]
fn xeval_reads_stdin() {
    let output = deno(&["xeval", "print('got ' + $)"], "a\nb\n");
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "got a\ngot b\n");
}

#[test]
fn repl_runs_until_eof() {
    let output = deno(&["repl"], "let x = 4\nx * x\n");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "> > 16\n> \n");
}

#[test]
fn empty_main_module_fails_the_assertion() {
    let output = deno(&[""], "");
    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains("assertion failed"),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn missing_module_exits_one() {
    let output = deno(&["run", "definitely-missing-module.js"], "");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("definitely-missing-module.js"));
}

#[test]
fn usage_errors_exit_two() {
    let output = deno(&["--log-level", "loud"], "");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn xeval_syntax_error_is_reported_before_reading_input() {
    let output = deno(&["xeval", "print("], "ignored\n");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("SyntaxError"), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());
}

#[test]
fn version_ignores_a_broken_local_config() {
    let dir = dir_with_broken_config("version");
    let output = deno_in(&dir, &["--version"], "");
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    let labels: Vec<&str> = text
        .lines()
        .filter_map(|line| line.split(": ").next())
        .collect();
    assert_eq!(labels, ["deno", "v8", "typescript"]);
    assert!(stderr(&output).contains("warning:"), "stderr: {}", stderr(&output));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn broken_local_config_fails_other_modes_without_color_on_a_pipe() {
    let dir = dir_with_broken_config("repl");
    let output = deno_in(&dir, &["repl"], "1\n");
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.starts_with("error:"), "stderr: {err}");
    assert!(err.contains("bogus"), "stderr: {err}");
    assert!(!err.contains(ANSI_ESCAPE), "stderr: {err:?}");
    assert!(stdout(&output).is_empty());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn deeply_nested_xeval_code_is_a_syntax_error() {
    let code = "(".repeat(100_000);
    let output = deno(&["xeval", &code], "1\n");
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("SyntaxError"), "stderr: {err}");
    assert!(err.contains("nested too deeply"), "stderr: {err}");
}
